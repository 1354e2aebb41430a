pub mod config;
pub mod grid;
pub mod persistence;
pub mod utils;

pub use grid::column::{Column, ColumnLayout, ColumnLayoutEntry, ColumnModel, MergePolicy};
pub use grid::directive::{FilterDirective, FilterPredicate, FilterSet, SortDirection, SortDirective};
pub use grid::field::Field;
pub use grid::grid_view::GridView;
pub use grid::page_cursor::{FetchParams, PageCursor, PageState, RecordPage};
pub use grid::record::Record;
pub use grid::view_compute::ViewCompute;
