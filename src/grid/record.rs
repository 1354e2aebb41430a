use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys tried, in order, when projecting a nested object to text
const OBJECT_LABEL_KEYS: [&str; 4] = ["name", "displayName", "value", "key"];

/// A single row fetched from the remote collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap a JSON value; anything but an object is rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Whether the record carries the field at all, even as null
    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    /// Text projection of a field; `None` for missing or null values
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).and_then(value_text)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Project a JSON value to the text shown in a cell or matched by a filter.
///
/// Nested objects (status, assignee, priority) use their first label-like
/// key; arrays join their projected elements with ", ".
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_text).collect();
            Some(parts.join(", "))
        }
        Value::Object(map) => OBJECT_LABEL_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(value_text)),
    }
}
