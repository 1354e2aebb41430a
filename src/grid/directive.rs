use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::grid::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Apply the direction to an ascending comparison result
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    pub field: String,
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Next sort after clicking a header: none -> asc -> desc -> none.
    /// Clicking a different header starts over at asc.
    pub fn cycle(current: Option<&SortDirective>, field: &str) -> Option<SortDirective> {
        match current {
            Some(sort) if sort.field == field => match sort.direction {
                SortDirection::Asc => Some(SortDirective::desc(field)),
                SortDirection::Desc => None,
            },
            _ => Some(SortDirective::asc(field)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "camelCase")]
pub enum FilterPredicate {
    /// Exact match on the value's text projection
    Equals(String),
    /// Case-insensitive substring match
    Contains(String),
}

impl FilterPredicate {
    pub fn needle(&self) -> &str {
        match self {
            FilterPredicate::Equals(s) | FilterPredicate::Contains(s) => s,
        }
    }

    /// Empty needles accept anything; missing values fail everything else
    pub fn matches(&self, value: Option<&str>) -> bool {
        if self.needle().is_empty() {
            return true;
        }
        let Some(value) = value else {
            return false;
        };
        match self {
            FilterPredicate::Equals(expected) => value == expected,
            FilterPredicate::Contains(needle) => {
                value.to_lowercase().contains(&needle.to_lowercase())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDirective {
    pub field: String,
    pub predicate: FilterPredicate,
}

impl FilterDirective {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            predicate: FilterPredicate::Equals(value.into()),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            predicate: FilterPredicate::Contains(value.into()),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let text = record.text(&self.field);
        self.predicate.matches(text.as_deref())
    }
}

/// Active filters, at most one per field, combined with AND
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    directives: Vec<FilterDirective>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter, replacing any existing one on the same field in place.
    /// Returns the replaced directive.
    pub fn insert(&mut self, directive: FilterDirective) -> Option<FilterDirective> {
        match self
            .directives
            .iter_mut()
            .find(|d| d.field == directive.field)
        {
            Some(existing) => Some(std::mem::replace(existing, directive)),
            None => {
                self.directives.push(directive);
                None
            }
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<FilterDirective> {
        let index = self.directives.iter().position(|d| d.field == field)?;
        Some(self.directives.remove(index))
    }

    pub fn get(&self, field: &str) -> Option<&FilterDirective> {
        self.directives.iter().find(|d| d.field == field)
    }

    pub fn clear(&mut self) {
        self.directives.clear();
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDirective> {
        self.directives.iter()
    }

    pub fn as_slice(&self) -> &[FilterDirective] {
        &self.directives
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.directives.iter().all(|d| d.matches(record))
    }
}

impl FromIterator<FilterDirective> for FilterSet {
    fn from_iter<I: IntoIterator<Item = FilterDirective>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for directive in iter {
            set.insert(directive);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_cycle() {
        let first = SortDirective::cycle(None, "created");
        assert_eq!(first, Some(SortDirective::asc("created")));
        let second = SortDirective::cycle(first.as_ref(), "created");
        assert_eq!(second, Some(SortDirective::desc("created")));
        assert_eq!(SortDirective::cycle(second.as_ref(), "created"), None);
        assert_eq!(
            SortDirective::cycle(second.as_ref(), "priority"),
            Some(SortDirective::asc("priority"))
        );
    }

    #[test]
    fn test_predicate_null_handling() {
        assert!(FilterPredicate::Contains(String::new()).matches(None));
        assert!(FilterPredicate::Equals(String::new()).matches(None));
        assert!(!FilterPredicate::Contains("x".into()).matches(None));
        assert!(!FilterPredicate::Equals("x".into()).matches(None));
    }

    #[test]
    fn test_contains_is_case_insensitive_and_equals_is_exact() {
        assert!(FilterPredicate::Contains("LOGIN".into()).matches(Some("Fix login page")));
        assert!(!FilterPredicate::Equals("open".into()).matches(Some("Open")));
        assert!(FilterPredicate::Equals("Open".into()).matches(Some("Open")));
    }

    #[test]
    fn test_filter_set_replaces_same_field() {
        let mut set = FilterSet::new();
        assert!(set.insert(FilterDirective::equals("status", "Open")).is_none());
        set.insert(FilterDirective::contains("summary", "login"));
        let replaced = set.insert(FilterDirective::equals("status", "Done"));

        assert_eq!(replaced, Some(FilterDirective::equals("status", "Open")));
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0], FilterDirective::equals("status", "Done"));
    }

    #[test]
    fn test_filter_set_and_semantics() {
        let record = Record::from_value(json!({"status": "Open", "summary": "Login page"})).unwrap();
        let mut set = FilterSet::new();
        assert!(set.matches(&record));

        set.insert(FilterDirective::equals("status", "Open"));
        assert!(set.matches(&record));

        set.insert(FilterDirective::contains("summary", "logout"));
        assert!(!set.matches(&record));

        set.remove("summary");
        assert!(set.matches(&record));
    }

    #[test]
    fn test_serialized_shapes() {
        let sort = serde_json::to_value(SortDirective::desc("created")).unwrap();
        assert_eq!(sort, json!({"field": "created", "direction": "desc"}));

        let filter = serde_json::to_value(FilterDirective::contains("summary", "login")).unwrap();
        assert_eq!(
            filter,
            json!({"field": "summary", "predicate": {"op": "contains", "value": "login"}})
        );
    }
}
