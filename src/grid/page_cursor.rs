use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::grid::directive::{FilterDirective, SortDirective};
use crate::grid::events::GridWarning;
use crate::grid::record::Record;

/// One page of a remotely paginated collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    #[serde(default)]
    pub items: Vec<Record>,
    /// 1-based
    pub page_index: usize,
    #[serde(default)]
    pub page_size: usize,
    pub total_count: usize,
}

impl RecordPage {
    pub fn total_pages(&self) -> usize {
        total_pages(self.total_count, self.page_size)
    }
}

/// Parameters for the next record fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchParams {
    pub page_index: usize,
    pub page_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortDirective>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterDirective>,
}

impl FetchParams {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
            sort: None,
            filters: Vec::new(),
        }
    }

    pub fn with_sort(mut self, sort: Option<SortDirective>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filters(mut self, filters: Vec<FilterDirective>) -> Self {
        self.filters = filters;
        self
    }

    /// Rows to skip for offset-based backends
    pub fn offset(&self) -> usize {
        self.page_index.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> usize {
        self.page_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

/// Result of reconciling a page response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub state: PageState,
    pub warning: Option<GridWarning>,
}

impl Reconciled {
    /// Whether the response was accepted (not stale)
    pub fn accepted(&self) -> bool {
        !matches!(self.warning, Some(GridWarning::StalePage { .. }))
    }
}

pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

/// Tracks the current page against the remote total count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    current_page: usize,
    page_size: usize,
    /// Unknown until the first response arrives
    total_count: Option<usize>,
}

impl PageCursor {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_count: None,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_count.unwrap_or(0), self.page_size)
    }

    fn last_page(&self) -> Option<usize> {
        self.total_count.map(|_| self.total_pages().max(1))
    }

    pub fn state(&self) -> PageState {
        PageState {
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages: self.total_pages(),
            total_count: self.total_count.unwrap_or(0),
        }
    }

    /// Move to `page_index` with `page_size` and describe the fetch.
    ///
    /// A different page size starts a new query at page 1. Otherwise the
    /// index is clamped to page 1 and, once a total is known, the last page.
    pub fn request(&mut self, page_index: usize, page_size: usize) -> FetchParams {
        let page_size = page_size.max(1);
        if page_size != self.page_size {
            debug!(
                "PageCursor: page size {} -> {}, resetting to page 1",
                self.page_size, page_size
            );
            self.page_size = page_size;
            self.current_page = 1;
        } else {
            let mut page = page_index.max(1);
            if let Some(last) = self.last_page() {
                page = page.min(last);
            }
            self.current_page = page;
        }
        FetchParams::new(self.current_page, self.page_size)
    }

    /// Sort or filters changed: the remote total no longer applies, so
    /// restart at page 1 with the total unknown.
    pub fn reset_query(&mut self) {
        debug!("PageCursor: query changed, resetting to page 1");
        self.current_page = 1;
        self.total_count = None;
    }

    pub fn next_page(&mut self) -> FetchParams {
        self.request(self.current_page.saturating_add(1), self.page_size)
    }

    pub fn prev_page(&mut self) -> FetchParams {
        self.request(self.current_page.saturating_sub(1), self.page_size)
    }

    pub fn first_page(&mut self) -> FetchParams {
        self.request(1, self.page_size)
    }

    pub fn last_page_params(&mut self) -> FetchParams {
        let last = self.last_page().unwrap_or(1);
        self.request(last, self.page_size)
    }

    /// Fold an authoritative page response into the cursor
    pub fn reconcile(&mut self, response: &RecordPage) -> PageState {
        self.reconcile_checked(response).state
    }

    /// Like [`reconcile`](Self::reconcile), also reporting any adjustment.
    ///
    /// A response for a different page size belongs to a superseded query
    /// and leaves the cursor unchanged. Otherwise the total is adopted and
    /// the page index clamped into `[1, max(1, total_pages)]`.
    pub fn reconcile_checked(&mut self, response: &RecordPage) -> Reconciled {
        if response.page_size != 0 && response.page_size != self.page_size {
            let warning = GridWarning::StalePage {
                expected: self.page_size,
                received: response.page_size,
            };
            warn!("PageCursor: {}", warning);
            return Reconciled {
                state: self.state(),
                warning: Some(warning),
            };
        }

        if response.items.len() > self.page_size {
            warn!(
                "PageCursor: page {} holds {} items, more than page size {}",
                response.page_index,
                response.items.len(),
                self.page_size
            );
        }

        self.total_count = Some(response.total_count);
        let last = self.total_pages().max(1);
        let clamped = response.page_index.clamp(1, last);
        self.current_page = clamped;

        let warning = if clamped != response.page_index {
            let warning = GridWarning::PageOutOfRange {
                requested: response.page_index,
                clamped,
            };
            warn!("PageCursor: {}", warning);
            Some(warning)
        } else {
            None
        };

        debug!(
            "PageCursor: page {}/{} ({} total)",
            self.current_page,
            self.total_pages(),
            response.total_count
        );

        Reconciled {
            state: self.state(),
            warning,
        }
    }
}
