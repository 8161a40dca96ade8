//! Category model

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category name (unique)
    pub name: String,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self { id: 0, name }
    }
}

/// Category with its article count, for category listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    pub post_count: i64,
}
