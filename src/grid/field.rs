use serde::{Deserialize, Serialize};

/// A field of a record collection as delivered by the remote schema endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub custom: bool,
    /// Whether the field can be used as a sort key
    #[serde(default)]
    pub orderable: bool,
    /// Whether the field should be visible by default
    #[serde(default)]
    pub navigable: bool,
}

impl Field {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            custom: false,
            orderable: false,
            navigable: false,
        }
    }

    pub fn orderable(mut self, orderable: bool) -> Self {
        self.orderable = orderable;
        self
    }

    pub fn navigable(mut self, navigable: bool) -> Self {
        self.navigable = navigable;
        self
    }

    pub fn custom(mut self, custom: bool) -> Self {
        self.custom = custom;
        self
    }
}
