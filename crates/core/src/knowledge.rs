//! Knowledge file type - one plain-text document in the store

use serde::{Deserialize, Serialize};

/// A plain-text document from the knowledge base directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeFile {
    /// File name within the store (always `*.txt`)
    pub name: String,

    /// UTF-8 file content
    pub content: String,
}

impl KnowledgeFile {
    /// Create a knowledge file value
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}
