// Behavioural properties of the grid engine, checked over small hand-built
// column sets, schemas and record pages.

use serde_json::{json, Value};
use tracker_grid::grid::column::merge;
use tracker_grid::grid::page_cursor::total_pages;
use tracker_grid::grid::reorder::reorder;
use tracker_grid::{
    Column, ColumnModel, Field, FilterDirective, FilterSet, MergePolicy, PageCursor, Record,
    RecordPage, SortDirective, ViewCompute,
};

fn column_sets() -> Vec<Vec<Column>> {
    vec![
        vec![],
        vec![Column::new("actions", "Actions")],
        vec![
            Column::new("key", "Key"),
            Column::new("actions", "Actions"),
        ],
        vec![
            Column::new("status", "status").with_selected(false),
            Column::new("select", ""),
            Column::new("key", "Key").with_sortable(true),
            Column::new("legacy", "Legacy field"),
        ],
    ]
}

fn schemas() -> Vec<Vec<Field>> {
    vec![
        vec![],
        vec![
            Field::new("key", "Key").orderable(true).navigable(true),
            Field::new("status", "Status").navigable(true),
        ],
        vec![
            Field::new("summary", "Summary").orderable(true).navigable(true),
            Field::new("customfield_1", "Story Points").custom(true).orderable(true),
            Field::new("status", "Status").navigable(true),
            Field::new("created", "Created").orderable(true).navigable(true),
        ],
    ]
}

fn keys(columns: &[Column]) -> Vec<&str> {
    columns.iter().map(|c| c.key.as_str()).collect()
}

#[test]
fn test_merge_is_idempotent() {
    for policy in [
        MergePolicy::default(),
        MergePolicy {
            include_hidden_fields: true,
        },
    ] {
        for columns in column_sets() {
            for fields in schemas() {
                let once = merge(&columns, &fields, policy);
                let twice = merge(&once, &fields, policy);
                assert_eq!(once, twice, "columns {:?} fields {:?}", keys(&columns), fields);
            }
        }
    }
}

#[test]
fn test_merge_preserves_local_only_columns() {
    for columns in column_sets() {
        for fields in schemas() {
            let merged = merge(&columns, &fields, MergePolicy::default());
            for column in &columns {
                if fields.iter().any(|f| f.id == column.key) {
                    continue;
                }
                let kept = merged.iter().find(|c| c.key == column.key);
                assert_eq!(kept, Some(column));
            }
        }
    }
}

#[test]
fn test_merge_preserves_existing_relative_order() {
    for columns in column_sets() {
        for fields in schemas() {
            let merged = merge(&columns, &fields, MergePolicy::default());
            let existing = keys(&columns);
            assert_eq!(&keys(&merged)[..existing.len()], existing.as_slice());
        }
    }
}

#[test]
fn test_merge_example_from_issue_view() {
    let existing = vec![
        Column::new("key", "Key"),
        Column::new("actions", "Actions"),
    ];
    let incoming = vec![
        Field::new("key", "Key").navigable(true),
        Field::new("status", "Status").navigable(true),
    ];

    let merged = merge(&existing, &incoming, MergePolicy::default());

    assert_eq!(keys(&merged), vec!["key", "actions", "status"]);
    assert!(merged[2].is_selected);
}

#[test]
fn test_reorder_cardinality_and_identity() {
    let full = vec![
        Column::new("a", "A"),
        Column::new("h1", "H1").with_selected(false),
        Column::new("b", "B"),
        Column::new("c", "C"),
        Column::new("h2", "H2").with_selected(false),
        Column::new("d", "D"),
    ];

    for drag in 0..6 {
        assert_eq!(reorder(&full, drag, drag), full);
        for hover in 0..6 {
            let result = reorder(&full, drag, hover);
            assert_eq!(result.len(), full.len());
            let mut before = keys(&full);
            let mut after = keys(&result);
            before.sort();
            after.sort();
            assert_eq!(before, after);
            // hidden columns never move
            assert_eq!(result[1].key, "h1");
            assert_eq!(result[4].key, "h2");
        }
    }

    let result = reorder(&full, 0, 2);
    let visible: Vec<&str> = result
        .iter()
        .filter(|c| c.is_selected)
        .map(|c| c.key.as_str())
        .collect();
    assert_eq!(visible, vec!["b", "c", "a", "d"]);
}

fn records(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .map(|v| Record::from_value(v).expect("record object"))
        .collect()
}

fn issue_columns() -> ColumnModel {
    ColumnModel::new(vec![
        Column::new("n", "N").with_sortable(true),
        Column::new("status", "Status"),
        Column::new("summary", "Summary"),
    ])
}

#[test]
fn test_sort_stability_in_both_directions() {
    let data = records(vec![
        json!({"idx": 0, "n": "b"}),
        json!({"idx": 1, "n": "a"}),
        json!({"idx": 2, "n": "a"}),
        json!({"idx": 3, "n": "b"}),
    ]);
    let columns = issue_columns();
    let filters = FilterSet::new();

    let asc = ViewCompute::compute_indices(&data, &columns, Some(&SortDirective::asc("n")), &filters);
    assert_eq!(asc, vec![1, 2, 0, 3]);

    let desc = ViewCompute::compute_indices(&data, &columns, Some(&SortDirective::desc("n")), &filters);
    assert_eq!(desc, vec![0, 3, 1, 2]);
}

#[test]
fn test_adding_filters_never_grows_result() {
    let data = records(vec![
        json!({"status": "Open", "summary": "Login fails"}),
        json!({"status": "Open", "summary": "Export CSV"}),
        json!({"status": "Done", "summary": "Login copy"}),
        json!({"status": null, "summary": "Unknown"}),
        json!({"summary": "No status at all"}),
    ]);
    let columns = issue_columns();
    let candidates = vec![
        FilterDirective::contains("summary", "login"),
        FilterDirective::equals("status", "Open"),
        FilterDirective::contains("status", ""),
        FilterDirective::equals("summary", "Export CSV"),
    ];

    let mut filters = FilterSet::new();
    let mut previous = ViewCompute::compute(&data, &columns, None, &filters).len();
    assert_eq!(previous, 5);
    for directive in candidates {
        filters.insert(directive);
        let count = ViewCompute::compute(&data, &columns, None, &filters).len();
        assert!(count <= previous);
        previous = count;
    }
    assert_eq!(previous, 0);
}

#[test]
fn test_empty_predicate_passes_missing_values() {
    let data = records(vec![json!({"status": null}), json!({})]);
    let filters: FilterSet = vec![FilterDirective::equals("status", "")].into_iter().collect();
    assert_eq!(ViewCompute::compute(&data, &issue_columns(), None, &filters).len(), 2);
}

#[test]
fn test_page_cursor_clamp_holds() {
    for page_size in 1..=7 {
        for total_count in 0..=30 {
            for page_index in 0..=12 {
                let mut cursor = PageCursor::new(page_size);
                let state = cursor.reconcile(&RecordPage {
                    items: Vec::new(),
                    page_index,
                    page_size,
                    total_count,
                });
                let last = total_pages(total_count, page_size).max(1);
                assert!(state.current_page >= 1);
                assert!(state.current_page <= last);
                assert_eq!(state.total_pages, total_count.div_ceil(page_size));
            }
        }
    }
}

#[test]
fn test_page_size_change_scenario() {
    let mut cursor = PageCursor::new(10);
    cursor.request(3, 10);
    let state = cursor.reconcile(&RecordPage {
        items: Vec::new(),
        page_index: 3,
        page_size: 10,
        total_count: 23,
    });
    assert_eq!(state.current_page, 3);
    assert_eq!(state.total_pages, 3);

    cursor.request(3, 20);
    let state = cursor.state();
    assert_eq!(state.current_page, 1);
    assert_eq!(state.total_pages, 2);
}
