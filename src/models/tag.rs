//! Tag model

use serde::{Deserialize, Serialize};

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Tag name
    pub name: String,
}

impl Tag {
    pub fn new(name: String) -> Self {
        Self { id: 0, name }
    }
}

/// Tag with its article usage count, for tag listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagWithCount {
    pub id: i64,
    pub name: String,
    pub article_count: i64,
}
