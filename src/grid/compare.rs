use serde_json::Value;
use std::cmp::Ordering;

use crate::grid::record::value_text;

/// Normalized sort key for a cell value
///
/// Ranks: missing/null < numeric < text. JSON numbers and strings that parse
/// as finite numbers are numeric; everything else compares as text.
#[derive(Debug, Clone)]
pub enum SortKey {
    Missing,
    Number(f64),
    Text(String),
}

impl SortKey {
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return SortKey::Missing;
        };

        match value {
            Value::Null => SortKey::Missing,
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.is_finite() => SortKey::Number(f),
                _ => SortKey::Text(n.to_string()),
            },
            Value::String(s) => match parse_number(s) {
                Some(f) => SortKey::Number(f),
                None => SortKey::Text(s.clone()),
            },
            other => match value_text(other) {
                Some(text) => match parse_number(&text) {
                    Some(f) => SortKey::Number(f),
                    None => SortKey::Text(text),
                },
                None => SortKey::Missing,
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => compare_text(a, b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Case-insensitive comparison; on a tie lowercase sorts before uppercase,
/// so "apple" < "Banana" and "a" < "A".
///
/// Ordering is by lowercased Unicode code point, not locale collation:
/// accented letters sort after the ASCII range ("zebra" < "éclair").
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b).reverse())
}

/// Compare two optional cell values with the grid's sort semantics
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    SortKey::from_value(a).cmp(&SortKey::from_value(b))
}
