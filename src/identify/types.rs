use serde::{Deserialize, Serialize};

/// Title/author pair recovered from a model response.
///
/// Both fields are non-empty whenever a value exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedInfo {
    pub title: String,
    pub author: String,
}

impl IdentifiedInfo {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }
}
