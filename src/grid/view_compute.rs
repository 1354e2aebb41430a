use tracing::{debug, trace};

use crate::grid::column::ColumnModel;
use crate::grid::compare::SortKey;
use crate::grid::directive::{FilterSet, SortDirective};
use crate::grid::record::Record;

/// Sorted, filtered projection of an in-memory record set
pub struct ViewCompute;

impl ViewCompute {
    /// Filter and sort `records`, returning the rows to display
    pub fn compute(
        records: &[Record],
        columns: &ColumnModel,
        sort: Option<&SortDirective>,
        filters: &FilterSet,
    ) -> Vec<Record> {
        Self::compute_indices(records, columns, sort, filters)
            .into_iter()
            .map(|idx| records[idx].clone())
            .collect()
    }

    /// Same as [`compute`](Self::compute) but yields indices into `records`
    pub fn compute_indices(
        records: &[Record],
        columns: &ColumnModel,
        sort: Option<&SortDirective>,
        filters: &FilterSet,
    ) -> Vec<usize> {
        let mut visible_rows: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| filters.matches(record))
            .map(|(idx, _)| idx)
            .collect();

        trace!(
            "compute: {} of {} records pass {} filters",
            visible_rows.len(),
            records.len(),
            filters.len()
        );

        if let Some(sort) = Self::effective_sort(records, columns, sort) {
            // sort_by is stable: equal keys keep input order in both directions
            let keys: Vec<SortKey> = visible_rows
                .iter()
                .map(|&idx| SortKey::from_value(records[idx].get(&sort.field)))
                .collect();
            let mut order: Vec<usize> = (0..visible_rows.len()).collect();
            order.sort_by(|&a, &b| sort.direction.apply(keys[a].cmp(&keys[b])));
            visible_rows = order.into_iter().map(|pos| visible_rows[pos]).collect();
            debug!(
                "compute: sorted {} rows by '{}' {:?}",
                visible_rows.len(),
                sort.field,
                sort.direction
            );
        }

        visible_rows
    }

    /// The sort that `compute` will actually apply.
    ///
    /// `None` when no sort is requested, the column is unknown or not
    /// sortable, or no record carries the field.
    pub fn effective_sort<'a>(
        records: &[Record],
        columns: &ColumnModel,
        sort: Option<&'a SortDirective>,
    ) -> Option<&'a SortDirective> {
        let sort = sort?;
        let column = columns.get(&sort.field)?;
        if !column.is_sortable {
            return None;
        }
        if !records.iter().any(|r| r.has_field(&sort.field)) {
            return None;
        }
        Some(sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::column::Column;
    use crate::grid::directive::FilterDirective;
    use serde_json::{json, Value};

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| Record::from_value(v).unwrap())
            .collect()
    }

    fn model() -> ColumnModel {
        ColumnModel::new(vec![
            Column::new("n", "N").with_sortable(true),
            Column::new("id", "Id").with_sortable(true),
            Column::new("notes", "Notes"),
        ])
    }

    fn ids(rows: &[Record]) -> Vec<i64> {
        rows.iter()
            .map(|r| r.get("id").and_then(Value::as_i64).unwrap_or(-1))
            .collect()
    }

    #[test]
    fn test_sort_is_stable_ascending() {
        let data = records(vec![
            json!({"id": 0, "n": "b"}),
            json!({"id": 1, "n": "a"}),
            json!({"id": 2, "n": "a"}),
        ]);
        let rows = ViewCompute::compute(&data, &model(), Some(&SortDirective::asc("n")), &FilterSet::new());
        assert_eq!(ids(&rows), vec![1, 2, 0]);
    }

    #[test]
    fn test_sort_is_stable_descending() {
        let data = records(vec![
            json!({"id": 0, "n": "a"}),
            json!({"id": 1, "n": "b"}),
            json!({"id": 2, "n": "a"}),
            json!({"id": 3, "n": "b"}),
        ]);
        let rows = ViewCompute::compute(&data, &model(), Some(&SortDirective::desc("n")), &FilterSet::new());
        assert_eq!(ids(&rows), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_non_sortable_column_is_ignored() {
        let data = records(vec![
            json!({"id": 0, "notes": "z"}),
            json!({"id": 1, "notes": "a"}),
        ]);
        let rows = ViewCompute::compute(&data, &model(), Some(&SortDirective::asc("notes")), &FilterSet::new());
        assert_eq!(ids(&rows), vec![0, 1]);

        let rows = ViewCompute::compute(&data, &model(), Some(&SortDirective::asc("unknown")), &FilterSet::new());
        assert_eq!(ids(&rows), vec![0, 1]);
    }

    #[test]
    fn test_sort_on_field_absent_from_records_is_ignored() {
        let data = records(vec![json!({"id": 3}), json!({"id": 1})]);
        let sort = SortDirective::asc("n");
        assert!(ViewCompute::effective_sort(&data, &model(), Some(&sort)).is_none());
        let rows = ViewCompute::compute(&data, &model(), Some(&sort), &FilterSet::new());
        assert_eq!(ids(&rows), vec![3, 1]);
    }

    #[test]
    fn test_filter_then_sort() {
        let data = records(vec![
            json!({"id": 0, "n": "30", "notes": "keep"}),
            json!({"id": 1, "n": "4", "notes": "drop"}),
            json!({"id": 2, "n": "100", "notes": "keep"}),
            json!({"id": 3, "n": null, "notes": "keep"}),
        ]);
        let filters: FilterSet = vec![FilterDirective::equals("notes", "keep")].into_iter().collect();
        let rows = ViewCompute::compute(&data, &model(), Some(&SortDirective::asc("n")), &filters);
        assert_eq!(ids(&rows), vec![3, 0, 2]);
    }

    #[test]
    fn test_mixed_numeric_and_text_ordering() {
        let data = records(vec![
            json!({"id": 0, "n": "beta"}),
            json!({"id": 1, "n": 10}),
            json!({"id": 2, "n": "9"}),
            json!({"id": 3, "n": "Alpha"}),
        ]);
        let rows = ViewCompute::compute(&data, &model(), Some(&SortDirective::asc("n")), &FilterSet::new());
        assert_eq!(ids(&rows), vec![2, 1, 3, 0]);
    }
}
