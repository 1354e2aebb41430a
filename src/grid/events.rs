//! View-scoped grid events and subscribers

use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info};

use crate::grid::directive::SortDirective;
use crate::grid::page_cursor::{FetchParams, PageState};

/// A directive or response that could not be applied as given.
///
/// None of these are errors for the caller: the grid has already fallen back
/// to its previous valid state by the time one is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridWarning {
    /// Schema fetch failed or came back empty; columns left untouched
    SchemaMergeNoOp { reason: String },
    /// Sort references an unknown, non-sortable or absent field
    InvalidSortTarget { field: String },
    /// Drag indices fell outside the visible columns
    InvalidReorderIndices {
        drag: usize,
        hover: usize,
        visible: usize,
    },
    /// Page index clamped into the valid range
    PageOutOfRange { requested: usize, clamped: usize },
    /// Page response for a page size the cursor no longer uses
    StalePage { expected: usize, received: usize },
}

impl fmt::Display for GridWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridWarning::SchemaMergeNoOp { reason } => {
                write!(f, "schema merge skipped: {}", reason)
            }
            GridWarning::InvalidSortTarget { field } => {
                write!(f, "sort on '{}' ignored", field)
            }
            GridWarning::InvalidReorderIndices {
                drag,
                hover,
                visible,
            } => write!(
                f,
                "reorder {} -> {} ignored ({} visible columns)",
                drag, hover, visible
            ),
            GridWarning::PageOutOfRange { requested, clamped } => {
                write!(f, "page {} clamped to {}", requested, clamped)
            }
            GridWarning::StalePage { expected, received } => write!(
                f,
                "discarded page of size {} (current size {})",
                received, expected
            ),
        }
    }
}

/// Events a grid view publishes to its subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    SchemaMerged { added: Vec<String>, total: usize },
    ColumnToggled { key: String, selected: bool },
    ColumnsReordered { visible_keys: Vec<String> },
    SortChanged(Option<SortDirective>),
    FiltersChanged { active: usize },
    PageRequested(FetchParams),
    PageReconciled(PageState),
    /// Ask the owner to refetch the current page
    RefreshRequested,
    Degraded(GridWarning),
}

/// Trait for components that listen to a grid view
pub trait GridSubscriber {
    fn on_grid_event(&mut self, event: &GridEvent);

    /// Subscriber name for debugging
    fn name(&self) -> &str;
}

/// Closure-backed subscriber
pub struct FnSubscriber<F: FnMut(&GridEvent)> {
    name: String,
    handler: F,
}

impl<F: FnMut(&GridEvent)> FnSubscriber<F> {
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F: FnMut(&GridEvent)> GridSubscriber for FnSubscriber<F> {
    fn on_grid_event(&mut self, event: &GridEvent) {
        (self.handler)(event);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

const DEFAULT_MAX_HISTORY: usize = 100;

/// Event channel owned by a single grid view
pub struct GridEventChannel {
    subscribers: Vec<Box<dyn GridSubscriber>>,

    /// Event history for debugging
    event_history: VecDeque<GridEvent>,

    max_history: usize,
}

impl Default for GridEventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl GridEventChannel {
    pub fn new() -> Self {
        Self::with_max_history(DEFAULT_MAX_HISTORY)
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            event_history: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn GridSubscriber>) {
        info!("GridEventChannel: adding subscriber: {}", subscriber.name());
        self.subscribers.push(subscriber);
    }

    pub fn subscribe_fn<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: FnMut(&GridEvent) + 'static,
    {
        self.subscribe(Box::new(FnSubscriber::new(name, handler)));
    }

    /// Remove subscribers by name, returning how many were dropped
    pub fn unsubscribe(&mut self, name: &str) -> usize {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.name() != name);
        before - self.subscribers.len()
    }

    pub fn dispatch(&mut self, event: GridEvent) {
        debug!("GridEventChannel: dispatching {:?}", event);

        for subscriber in &mut self.subscribers {
            subscriber.on_grid_event(&event);
        }

        if self.max_history > 0 {
            if self.event_history.len() >= self.max_history {
                self.event_history.pop_front();
            }
            self.event_history.push_back(event);
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &GridEvent> {
        self.event_history.iter()
    }

    pub fn clear_history(&mut self) {
        self.event_history.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
