use std::collections::HashMap;
use std::fmt;

use crate::grid::column::Column;
use crate::grid::record::Record;

/// What a cell shows, independent of how the page draws it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayValue {
    Empty,
    Text(String),
    Link { label: String, href: String },
    /// Short status-like label (status, priority, issue type)
    Badge(String),
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Empty => Ok(()),
            DisplayValue::Text(text) | DisplayValue::Badge(text) => write!(f, "{}", text),
            DisplayValue::Link { label, .. } => write!(f, "{}", label),
        }
    }
}

pub type RenderFn = Box<dyn Fn(&Record) -> DisplayValue>;

/// Per-column cell renderers with a text fallback for unregistered keys
#[derive(Default)]
pub struct CellRendererRegistry {
    renderers: HashMap<String, RenderFn>,
}

impl CellRendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderer for a column key, replacing any previous one
    pub fn register<F>(&mut self, key: impl Into<String>, renderer: F)
    where
        F: Fn(&Record) -> DisplayValue + 'static,
    {
        self.renderers.insert(key.into(), Box::new(renderer));
    }

    pub fn unregister(&mut self, key: &str) -> bool {
        self.renderers.remove(key).is_some()
    }

    pub fn has_renderer(&self, key: &str) -> bool {
        self.renderers.contains_key(key)
    }

    pub fn render(&self, column: &Column, record: &Record) -> DisplayValue {
        match self.renderers.get(&column.key) {
            Some(renderer) => renderer(record),
            None => default_render(&column.key, record),
        }
    }

    /// Render one row for the given headers
    pub fn render_row(&self, headers: &[&Column], record: &Record) -> Vec<DisplayValue> {
        headers
            .iter()
            .map(|column| self.render(column, record))
            .collect()
    }
}

/// Fallback: the field's text projection, or empty
pub fn default_render(field: &str, record: &Record) -> DisplayValue {
    match record.text(field) {
        Some(text) if !text.is_empty() => DisplayValue::Text(text),
        _ => DisplayValue::Empty,
    }
}
