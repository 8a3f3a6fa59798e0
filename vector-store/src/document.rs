use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata stored alongside a document in the index
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DocumentMetadata {
    /// Human-readable title of the source document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Custom metadata fields
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl DocumentMetadata {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            custom: HashMap::new(),
        }
    }
}
