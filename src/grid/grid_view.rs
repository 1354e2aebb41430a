use tracing::{debug, info, warn};

use crate::config::Config;
use crate::grid::cell_renderer::{CellRendererRegistry, DisplayValue};
use crate::grid::column::{Column, ColumnLayout, ColumnModel, MergePolicy};
use crate::grid::directive::{FilterDirective, FilterSet, SortDirective};
use crate::grid::events::{GridEvent, GridEventChannel, GridWarning};
use crate::grid::field::Field;
use crate::grid::page_cursor::{FetchParams, PageCursor, PageState, RecordPage};
use crate::grid::record::Record;
use crate::grid::reorder::{DragSession, HoverBounds};
use crate::grid::view_compute::ViewCompute;

/// The grid state behind one page of the dashboard.
///
/// Owns its column model, sort and filter directives, page cursor and the
/// last fetched page. Pages feed it schemas and record pages from their own
/// fetch layer and read back headers, rows and fetch parameters.
pub struct GridView {
    name: String,
    columns: ColumnModel,
    local_columns: Vec<Column>,
    policy: MergePolicy,
    sort: Option<SortDirective>,
    filters: FilterSet,
    cursor: PageCursor,
    page_size_options: Vec<usize>,
    page: Option<RecordPage>,
    renderers: CellRendererRegistry,
    events: GridEventChannel,
}

impl GridView {
    pub fn new(name: impl Into<String>, local_columns: Vec<Column>, config: &Config) -> Self {
        let name = name.into();
        debug!(
            "GridView '{}': {} local columns, page size {}",
            name,
            local_columns.len(),
            config.paging.default_page_size
        );
        Self {
            name,
            columns: ColumnModel::new(local_columns.clone()),
            local_columns,
            policy: config.columns.merge_policy(),
            sort: None,
            filters: FilterSet::new(),
            cursor: PageCursor::new(config.paging.default_page_size),
            page_size_options: config.paging.page_size_options.clone(),
            page: None,
            renderers: CellRendererRegistry::new(),
            events: GridEventChannel::new(),
        }
    }

    /// Restore column order and visibility saved by a previous session
    pub fn with_layout(mut self, layout: &ColumnLayout) -> Self {
        self.columns = ColumnModel::from_layout(layout, &self.local_columns);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &ColumnModel {
        &self.columns
    }

    /// Headers to render, in order
    pub fn headers(&self) -> Vec<&Column> {
        self.columns.visible_columns()
    }

    pub fn sort(&self) -> Option<&SortDirective> {
        self.sort.as_ref()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn page_state(&self) -> PageState {
        self.cursor.state()
    }

    /// Choices for the density picker
    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    pub fn page(&self) -> Option<&RecordPage> {
        self.page.as_ref()
    }

    pub fn layout(&self) -> ColumnLayout {
        self.columns.layout()
    }

    pub fn events(&self) -> &GridEventChannel {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut GridEventChannel {
        &mut self.events
    }

    pub fn renderers_mut(&mut self) -> &mut CellRendererRegistry {
        &mut self.renderers
    }

    fn degrade(&mut self, warning: GridWarning) {
        warn!("GridView '{}': {}", self.name, warning);
        self.events.dispatch(GridEvent::Degraded(warning));
    }

    // ---- schema -------------------------------------------------------

    /// Merge a freshly fetched field schema into the column model
    pub fn apply_schema(&mut self, fields: &[Field]) {
        if fields.is_empty() {
            self.degrade(GridWarning::SchemaMergeNoOp {
                reason: "empty schema".to_string(),
            });
            return;
        }

        let merged = self.columns.merged(fields, self.policy);
        let added: Vec<String> = merged
            .columns()
            .iter()
            .filter(|c| !self.columns.contains(&c.key))
            .map(|c| c.key.clone())
            .collect();
        let changed = merged != self.columns;
        self.columns = merged;

        info!(
            "GridView '{}': schema merged, {} new, {} total",
            self.name,
            added.len(),
            self.columns.len()
        );
        if changed {
            self.events.dispatch(GridEvent::SchemaMerged {
                added,
                total: self.columns.len(),
            });
            self.check_sort_target();
        }
    }

    /// Apply the outcome of a schema fetch; a failed fetch keeps the columns
    pub fn apply_schema_result<E: std::fmt::Display>(&mut self, result: Result<Vec<Field>, E>) {
        match result {
            Ok(fields) => self.apply_schema(&fields),
            Err(e) => self.degrade(GridWarning::SchemaMergeNoOp {
                reason: e.to_string(),
            }),
        }
    }

    // ---- columns ------------------------------------------------------

    pub fn toggle_column(&mut self, key: &str) -> Option<bool> {
        let selected = self.columns.toggle_column(key)?;
        self.events.dispatch(GridEvent::ColumnToggled {
            key: key.to_string(),
            selected,
        });
        Some(selected)
    }

    pub fn set_column_selected(&mut self, key: &str, selected: bool) -> bool {
        let was = self.columns.get(key).map(|c| c.is_selected);
        if !self.columns.set_column_selected(key, selected) {
            return false;
        }
        if was != Some(selected) {
            self.events.dispatch(GridEvent::ColumnToggled {
                key: key.to_string(),
                selected,
            });
        }
        true
    }

    pub fn unhide_all_columns(&mut self) {
        let hidden: Vec<String> = self
            .columns
            .hidden_column_keys()
            .into_iter()
            .map(String::from)
            .collect();
        self.columns.unhide_all_columns();
        for key in hidden {
            self.events.dispatch(GridEvent::ColumnToggled {
                key,
                selected: true,
            });
        }
    }

    fn columns_reordered(&mut self) {
        let visible_keys = self
            .columns
            .visible_keys()
            .into_iter()
            .map(String::from)
            .collect();
        self.events
            .dispatch(GridEvent::ColumnsReordered { visible_keys });
    }

    /// Move a visible column; out-of-range indices leave the model unchanged
    pub fn reorder_columns(&mut self, drag_visible_index: usize, hover_visible_index: usize) -> bool {
        if drag_visible_index == hover_visible_index
            && drag_visible_index < self.columns.visible_count()
        {
            return true;
        }
        if self
            .columns
            .reorder_columns(drag_visible_index, hover_visible_index)
        {
            self.columns_reordered();
            true
        } else {
            let visible = self.columns.visible_count();
            self.degrade(GridWarning::InvalidReorderIndices {
                drag: drag_visible_index,
                hover: hover_visible_index,
                visible,
            });
            false
        }
    }

    fn moved_or_degrade(&mut self, moved: bool, drag: usize, hover: usize) -> bool {
        if moved {
            self.columns_reordered();
        } else {
            let visible = self.columns.visible_count();
            self.degrade(GridWarning::InvalidReorderIndices {
                drag,
                hover,
                visible,
            });
        }
        moved
    }

    pub fn move_column_left(&mut self, visible_index: usize) -> bool {
        let moved = self.columns.move_column_left(visible_index);
        self.moved_or_degrade(moved, visible_index, visible_index.saturating_sub(1))
    }

    pub fn move_column_right(&mut self, visible_index: usize) -> bool {
        let moved = self.columns.move_column_right(visible_index);
        self.moved_or_degrade(moved, visible_index, visible_index.saturating_add(1))
    }

    pub fn begin_drag(&self, visible_index: usize) -> Option<DragSession> {
        DragSession::begin(&self.columns, visible_index)
    }

    /// Feed a pointer hover into a drag; true when a move was committed
    pub fn drag_hover(
        &mut self,
        session: &DragSession,
        hover_visible_index: usize,
        pointer: f64,
        bounds: HoverBounds,
    ) -> bool {
        match session.hover(&self.columns, hover_visible_index, pointer, bounds) {
            Some((drag, hover)) => self.reorder_columns(drag, hover),
            None => false,
        }
    }

    // ---- sort and filter ----------------------------------------------

    fn records(&self) -> &[Record] {
        self.page.as_ref().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    /// Report a sort that `compute` will ignore. Only checked once records
    /// exist, since an empty page cannot tell whether the field is absent.
    fn check_sort_target(&mut self) {
        let Some(sort) = self.sort.as_ref() else {
            return;
        };
        let records = self.records();
        let column_ok = self.columns.get(&sort.field).is_some_and(|c| c.is_sortable);
        let ignored = !column_ok
            || (!records.is_empty()
                && ViewCompute::effective_sort(records, &self.columns, Some(sort)).is_none());
        if ignored {
            let field = sort.field.clone();
            self.degrade(GridWarning::InvalidSortTarget { field });
        }
    }

    pub fn set_sort(&mut self, sort: Option<SortDirective>) {
        if self.sort == sort {
            return;
        }
        self.sort = sort;
        self.cursor.reset_query();
        self.events.dispatch(GridEvent::SortChanged(self.sort.clone()));
        self.check_sort_target();
    }

    /// Header click: none -> asc -> desc -> none
    pub fn toggle_sort(&mut self, key: &str) -> Option<&SortDirective> {
        let next = SortDirective::cycle(self.sort.as_ref(), key);
        self.set_sort(next);
        self.sort.as_ref()
    }

    pub fn set_filter(&mut self, directive: FilterDirective) {
        self.filters.insert(directive);
        self.cursor.reset_query();
        self.events.dispatch(GridEvent::FiltersChanged {
            active: self.filters.len(),
        });
    }

    pub fn remove_filter(&mut self, field: &str) -> bool {
        let removed = self.filters.remove(field).is_some();
        if removed {
            self.cursor.reset_query();
            self.events.dispatch(GridEvent::FiltersChanged {
                active: self.filters.len(),
            });
        }
        removed
    }

    pub fn clear_filters(&mut self) {
        if self.filters.is_empty() {
            return;
        }
        self.filters.clear();
        self.cursor.reset_query();
        self.events
            .dispatch(GridEvent::FiltersChanged { active: 0 });
    }

    // ---- paging -------------------------------------------------------

    fn fetch(&mut self, params: FetchParams) -> FetchParams {
        let params = params
            .with_sort(self.sort.clone())
            .with_filters(self.filters.as_slice().to_vec());
        self.events
            .dispatch(GridEvent::PageRequested(params.clone()));
        params
    }

    pub fn request_page(&mut self, page_index: usize) -> FetchParams {
        let page_size = self.cursor.page_size();
        let params = self.cursor.request(page_index, page_size);
        self.fetch(params)
    }

    /// Change density; always restarts at page 1
    pub fn change_page_size(&mut self, page_size: usize) -> FetchParams {
        let params = self.cursor.request(1, page_size);
        self.fetch(params)
    }

    pub fn next_page(&mut self) -> FetchParams {
        let params = self.cursor.next_page();
        self.fetch(params)
    }

    pub fn prev_page(&mut self) -> FetchParams {
        let params = self.cursor.prev_page();
        self.fetch(params)
    }

    pub fn first_page(&mut self) -> FetchParams {
        let params = self.cursor.first_page();
        self.fetch(params)
    }

    pub fn last_page(&mut self) -> FetchParams {
        let params = self.cursor.last_page_params();
        self.fetch(params)
    }

    /// Ask the owner to refetch the current page
    pub fn request_refresh(&mut self) {
        self.events.dispatch(GridEvent::RefreshRequested);
    }

    /// Accept a fetched page. Stale pages (another page size) are dropped.
    pub fn apply_page(&mut self, response: RecordPage) -> PageState {
        let reconciled = self.cursor.reconcile_checked(&response);
        let accepted = reconciled.accepted();
        if let Some(warning) = reconciled.warning {
            self.degrade(warning);
        }
        if accepted {
            self.page = Some(response);
            self.events
                .dispatch(GridEvent::PageReconciled(reconciled.state));
            self.check_sort_target();
        }
        reconciled.state
    }

    // ---- output -------------------------------------------------------

    /// Rows of the current page after filtering and sorting
    pub fn rows(&self) -> Vec<&Record> {
        let records = self.records();
        ViewCompute::compute_indices(records, &self.columns, self.sort.as_ref(), &self.filters)
            .into_iter()
            .map(|idx| &records[idx])
            .collect()
    }

    /// Rows rendered cell by cell for the current headers
    pub fn rendered_rows(&self) -> Vec<Vec<DisplayValue>> {
        let headers = self.headers();
        self.rows()
            .into_iter()
            .map(|record| self.renderers.render_row(&headers, record))
            .collect()
    }
}
