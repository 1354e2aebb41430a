//! Grid engine for the tracker dashboard
//!
//! Column model, reordering, sort/filter view computation and remote
//! pagination. Every page of the dashboard drives a `GridView` with its own
//! field schema and record set; nothing in here performs I/O.

pub mod cell_renderer;
pub mod column;
pub mod compare;
pub mod directive;
pub mod events;
pub mod field;
pub mod grid_view;
pub mod page_cursor;
pub mod record;
pub mod reorder;
pub mod view_compute;
