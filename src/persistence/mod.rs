//! Column layout persistence
//!
//! Optional: views work without it, starting from their local columns.

pub mod layout_store;

pub use layout_store::LayoutStore;
