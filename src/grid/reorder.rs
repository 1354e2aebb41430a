use tracing::{debug, trace, warn};

use crate::grid::column::{Column, ColumnModel};

/// Move a visible column, leaving hidden columns where they are.
///
/// Indices address the visible subset. Out-of-range indices return `full`
/// unchanged.
pub fn reorder(full: &[Column], drag_visible_index: usize, hover_visible_index: usize) -> Vec<Column> {
    checked_reorder(full, drag_visible_index, hover_visible_index).unwrap_or_else(|| full.to_vec())
}

/// Like [`reorder`] but returns `None` when either index is out of range
pub fn checked_reorder(
    full: &[Column],
    drag_visible_index: usize,
    hover_visible_index: usize,
) -> Option<Vec<Column>> {
    let mut visible: Vec<&Column> = full.iter().filter(|c| c.is_selected).collect();

    if drag_visible_index >= visible.len() || hover_visible_index >= visible.len() {
        warn!(
            "reorder: indices {} -> {} outside {} visible columns",
            drag_visible_index,
            hover_visible_index,
            visible.len()
        );
        return None;
    }

    if drag_visible_index == hover_visible_index {
        return Some(full.to_vec());
    }

    let dragged = visible.remove(drag_visible_index);
    visible.insert(hover_visible_index, dragged);
    debug!(
        "reorder: moved '{}' from {} to {}",
        dragged.key, drag_visible_index, hover_visible_index
    );

    let mut reordered = visible.into_iter();
    let columns = full
        .iter()
        .map(|column| {
            if column.is_selected {
                reordered.next().unwrap_or(column).clone()
            } else {
                column.clone()
            }
        })
        .collect();
    Some(columns)
}

/// Swap with the previous visible column; the first column wraps to the end
pub fn move_left(full: &[Column], visible_index: usize) -> Option<Vec<Column>> {
    let len = full.iter().filter(|c| c.is_selected).count();
    if visible_index >= len {
        return None;
    }
    let target = if visible_index == 0 {
        len - 1
    } else {
        visible_index - 1
    };
    checked_reorder(full, visible_index, target)
}

/// Swap with the next visible column; the last column wraps to the front
pub fn move_right(full: &[Column], visible_index: usize) -> Option<Vec<Column>> {
    let len = full.iter().filter(|c| c.is_selected).count();
    if visible_index >= len {
        return None;
    }
    let target = if visible_index == len - 1 {
        0
    } else {
        visible_index + 1
    };
    checked_reorder(full, visible_index, target)
}

/// Extent of the header cell currently under the pointer, along the drag axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverBounds {
    pub start: f64,
    pub end: f64,
}

impl HoverBounds {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Whether a hover should commit a move.
///
/// Moving forward commits only once the pointer is past the hovered cell's
/// midpoint, moving backward only once it is before it. A pointer exactly on
/// the midpoint never commits.
pub fn should_commit(drag_index: usize, hover_index: usize, pointer: f64, bounds: HoverBounds) -> bool {
    let midpoint = bounds.midpoint();
    if drag_index < hover_index {
        pointer > midpoint
    } else if drag_index > hover_index {
        pointer < midpoint
    } else {
        false
    }
}

/// An in-progress header drag.
///
/// Only the dragged key is remembered. Its visible index is looked up again
/// on every hover, so toggling columns mid-drag cannot desynchronize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    key: String,
}

impl DragSession {
    pub fn begin(model: &ColumnModel, visible_index: usize) -> Option<Self> {
        let column = model.visible_columns().into_iter().nth(visible_index)?;
        trace!("drag: begin '{}' at {}", column.key, visible_index);
        Some(Self {
            key: column.key.clone(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resolve a hover into a `(drag, hover)` move to apply, if any.
    ///
    /// Returns `None` when the dragged column is no longer visible, the
    /// hover index is out of range, or the hysteresis rule holds the move.
    pub fn hover(
        &self,
        model: &ColumnModel,
        hover_visible_index: usize,
        pointer: f64,
        bounds: HoverBounds,
    ) -> Option<(usize, usize)> {
        let drag_index = model.visible_position(&self.key)?;
        if hover_visible_index >= model.visible_count() {
            return None;
        }
        if !should_commit(drag_index, hover_visible_index, pointer, bounds) {
            return None;
        }
        Some((drag_index, hover_visible_index))
    }
}
