use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::grid::field::Field;
use crate::grid::reorder;

/// A renderable column of the grid
///
/// Columns backed by a remote `Field` share its id as `key`. Columns with no
/// backing field (row actions, computed cells) are local-only and survive
/// every schema merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub key: String,
    pub title: String,
    pub is_sortable: bool,
    pub is_selected: bool,
}

impl Column {
    /// Create a visible, non-sortable column
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            is_sortable: false,
            is_selected: true,
        }
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.is_sortable = sortable;
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.is_selected = selected;
        self
    }

    fn from_field(field: &Field) -> Self {
        Self {
            key: field.id.clone(),
            title: field.name.clone(),
            is_sortable: field.orderable,
            is_selected: field.navigable,
        }
    }
}

/// Controls which schema fields become new columns during a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergePolicy {
    /// Append non-navigable fields as hidden columns instead of skipping them
    pub include_hidden_fields: bool,
}

/// Persisted visibility/order of a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnLayoutEntry {
    pub key: String,
    pub is_selected: bool,
}

pub type ColumnLayout = Vec<ColumnLayoutEntry>;

/// Merge a freshly fetched field schema into an existing column list.
///
/// Existing columns keep their position and selection; matched ones take the
/// field's title and sortability. Unmatched existing columns are kept as is.
/// New fields are appended in schema order. An empty schema leaves `existing`
/// untouched.
pub fn merge(existing: &[Column], incoming: &[Field], policy: MergePolicy) -> Vec<Column> {
    if incoming.is_empty() {
        debug!("merge: empty schema, keeping {} columns", existing.len());
        return existing.to_vec();
    }

    let mut fields_by_id: HashMap<&str, &Field> = HashMap::with_capacity(incoming.len());
    for field in incoming {
        fields_by_id.entry(field.id.as_str()).or_insert(field);
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(existing.len() + incoming.len());
    let mut merged = Vec::with_capacity(existing.len() + incoming.len());

    for column in existing {
        if !seen.insert(column.key.as_str()) {
            continue;
        }
        let mut column = column.clone();
        if let Some(field) = fields_by_id.get(column.key.as_str()) {
            column.title = field.name.clone();
            column.is_sortable = field.orderable;
        } else {
            trace!("merge: keeping local-only column '{}'", column.key);
        }
        merged.push(column);
    }

    for field in incoming {
        if seen.contains(field.id.as_str()) {
            continue;
        }
        if !field.navigable && !policy.include_hidden_fields {
            continue;
        }
        seen.insert(field.id.as_str());
        trace!("merge: appending new column '{}'", field.id);
        merged.push(Column::from_field(field));
    }

    debug!(
        "merge: {} existing + {} fields -> {} columns",
        existing.len(),
        incoming.len(),
        merged.len()
    );
    merged
}

/// Ordered, key-unique list of columns for one collection view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnModel {
    columns: Vec<Column>,
}

impl ColumnModel {
    /// Build a model, dropping any repeated key after its first occurrence
    pub fn new(columns: Vec<Column>) -> Self {
        let mut seen = HashSet::new();
        let columns = columns
            .into_iter()
            .filter(|c| seen.insert(c.key.clone()))
            .collect();
        Self { columns }
    }

    /// Rebuild a model from a stored layout.
    ///
    /// Layout keys that match a local column reuse its title and sortability;
    /// other keys get a placeholder title until the next schema merge fills it
    /// in. Local columns missing from the layout are appended.
    pub fn from_layout(layout: &[ColumnLayoutEntry], local_columns: &[Column]) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(layout.len() + local_columns.len());

        for entry in layout {
            if !seen.insert(entry.key.clone()) {
                continue;
            }
            let column = match local_columns.iter().find(|c| c.key == entry.key) {
                Some(local) => local.clone().with_selected(entry.is_selected),
                None => Column::new(entry.key.clone(), entry.key.clone())
                    .with_selected(entry.is_selected),
            };
            columns.push(column);
        }

        for local in local_columns {
            if seen.insert(local.key.clone()) {
                columns.push(local.clone());
            }
        }

        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.key.as_str()).collect()
    }

    /// The rendered headers: selected columns in model order
    pub fn visible_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_selected).collect()
    }

    pub fn visible_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_selected)
            .map(|c| c.key.as_str())
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_selected).count()
    }

    /// Index of a column within the visible subset
    pub fn visible_position(&self, key: &str) -> Option<usize> {
        self.columns
            .iter()
            .filter(|c| c.is_selected)
            .position(|c| c.key == key)
    }

    pub fn hidden_column_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.is_selected)
            .map(|c| c.key.as_str())
            .collect()
    }

    pub fn has_hidden_columns(&self) -> bool {
        self.columns.iter().any(|c| !c.is_selected)
    }

    /// Flip a column's visibility, returning the new state
    pub fn toggle_column(&mut self, key: &str) -> Option<bool> {
        let column = self.columns.iter_mut().find(|c| c.key == key)?;
        column.is_selected = !column.is_selected;
        debug!("toggle_column: '{}' selected={}", key, column.is_selected);
        Some(column.is_selected)
    }

    /// Set a column's visibility; false when the key is unknown
    pub fn set_column_selected(&mut self, key: &str, selected: bool) -> bool {
        match self.columns.iter_mut().find(|c| c.key == key) {
            Some(column) => {
                column.is_selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn unhide_all_columns(&mut self) {
        for column in &mut self.columns {
            column.is_selected = true;
        }
    }

    /// Merge a schema into this model, returning the new model
    pub fn merged(&self, incoming: &[Field], policy: MergePolicy) -> Self {
        Self {
            columns: merge(&self.columns, incoming, policy),
        }
    }

    /// Move a visible column; false (and no change) when an index is out of range
    pub fn reorder_columns(&mut self, drag_visible_index: usize, hover_visible_index: usize) -> bool {
        match reorder::checked_reorder(&self.columns, drag_visible_index, hover_visible_index) {
            Some(columns) => {
                self.columns = columns;
                true
            }
            None => false,
        }
    }

    /// Move a visible column one slot left, wrapping from first to last
    pub fn move_column_left(&mut self, visible_index: usize) -> bool {
        match reorder::move_left(&self.columns, visible_index) {
            Some(columns) => {
                self.columns = columns;
                true
            }
            None => false,
        }
    }

    /// Move a visible column one slot right, wrapping from last to first
    pub fn move_column_right(&mut self, visible_index: usize) -> bool {
        match reorder::move_right(&self.columns, visible_index) {
            Some(columns) => {
                self.columns = columns;
                true
            }
            None => false,
        }
    }

    /// Snapshot of order and visibility for persistence
    pub fn layout(&self) -> ColumnLayout {
        self.columns
            .iter()
            .map(|c| ColumnLayoutEntry {
                key: c.key.clone(),
                is_selected: c.is_selected,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions() -> Column {
        Column::new("actions", "Actions")
    }

    fn keys(columns: &[Column]) -> Vec<&str> {
        columns.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn test_merge_appends_new_fields_after_local_columns() {
        let existing = vec![Column::new("key", "Key"), actions()];
        let incoming = vec![
            Field::new("key", "Key").navigable(true),
            Field::new("status", "Status").navigable(true),
        ];

        let merged = merge(&existing, &incoming, MergePolicy::default());

        assert_eq!(keys(&merged), vec!["key", "actions", "status"]);
        assert!(merged[2].is_selected);
    }

    #[test]
    fn test_merge_updates_title_and_sortability_but_keeps_selection() {
        let existing = vec![Column::new("summary", "summary").with_selected(false)];
        let incoming = vec![Field::new("summary", "Summary")
            .orderable(true)
            .navigable(true)];

        let merged = merge(&existing, &incoming, MergePolicy::default());

        assert_eq!(merged[0].title, "Summary");
        assert!(merged[0].is_sortable);
        assert!(!merged[0].is_selected);
    }

    #[test]
    fn test_merge_with_empty_schema_is_noop() {
        let existing = vec![Column::new("key", "Key"), actions()];
        assert_eq!(merge(&existing, &[], MergePolicy::default()), existing);
    }

    #[test]
    fn test_merge_skips_non_navigable_fields_by_default() {
        let incoming = vec![
            Field::new("key", "Key").navigable(true),
            Field::new("environment", "Environment"),
        ];

        let merged = merge(&[], &incoming, MergePolicy::default());
        assert_eq!(keys(&merged), vec!["key"]);

        let policy = MergePolicy {
            include_hidden_fields: true,
        };
        let merged = merge(&[], &incoming, policy);
        assert_eq!(keys(&merged), vec!["key", "environment"]);
        assert!(!merged[1].is_selected);
    }

    #[test]
    fn test_merge_ignores_duplicate_field_ids() {
        let incoming = vec![
            Field::new("status", "Status").navigable(true),
            Field::new("status", "Status (dup)").navigable(true),
        ];

        let merged = merge(&[], &incoming, MergePolicy::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "Status");
    }

    #[test]
    fn test_new_drops_duplicate_keys() {
        let model = ColumnModel::new(vec![
            Column::new("key", "Key"),
            Column::new("key", "Other"),
            actions(),
        ]);
        assert_eq!(model.keys(), vec!["key", "actions"]);
        assert_eq!(model.get("key").map(|c| c.title.as_str()), Some("Key"));
    }

    #[test]
    fn test_toggle_and_hidden_columns() {
        let mut model = ColumnModel::new(vec![
            Column::new("key", "Key"),
            Column::new("summary", "Summary"),
            actions(),
        ]);

        assert_eq!(model.toggle_column("summary"), Some(false));
        assert_eq!(model.visible_keys(), vec!["key", "actions"]);
        assert_eq!(model.hidden_column_keys(), vec!["summary"]);
        assert!(model.has_hidden_columns());
        assert_eq!(model.toggle_column("missing"), None);

        model.unhide_all_columns();
        assert!(!model.has_hidden_columns());
        assert_eq!(model.visible_count(), 3);
    }

    #[test]
    fn test_layout_restore_keeps_order_and_selection() {
        let layout = vec![
            ColumnLayoutEntry {
                key: "status".into(),
                is_selected: false,
            },
            ColumnLayoutEntry {
                key: "actions".into(),
                is_selected: true,
            },
            ColumnLayoutEntry {
                key: "status".into(),
                is_selected: true,
            },
        ];
        let locals = vec![actions().with_sortable(false), Column::new("select", "")];

        let model = ColumnModel::from_layout(&layout, &locals);

        assert_eq!(model.keys(), vec!["status", "actions", "select"]);
        assert!(!model.get("status").map(|c| c.is_selected).unwrap_or(true));
        assert_eq!(model.get("actions").map(|c| c.title.as_str()), Some("Actions"));
    }

    #[test]
    fn test_visible_position() {
        let model = ColumnModel::new(vec![
            Column::new("a", "A"),
            Column::new("b", "B").with_selected(false),
            Column::new("c", "C"),
        ]);
        assert_eq!(model.visible_position("c"), Some(1));
        assert_eq!(model.visible_position("b"), None);
    }
}
