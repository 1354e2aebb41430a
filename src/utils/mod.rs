//! Utility helpers
//!
//! Application paths and tracing setup.

pub mod app_paths;
pub mod logging;
