//! Configuration module
//!
//! Paging defaults, column merge policy and logging settings, read from a
//! TOML file.

pub mod config;

pub use config::Config;
