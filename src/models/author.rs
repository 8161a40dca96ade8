//! Author model

use serde::{Deserialize, Serialize};

/// Editorial author entity with biography and optional portrait.
///
/// Authors are curated records independent of user accounts; article bylines
/// reference user profiles instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Biography text
    pub biography: Option<String>,
    /// Profession or title
    pub profession: Option<String>,
    /// Portrait image path or URL
    pub image: Option<String>,
}

impl Author {
    pub fn new(name: String) -> Self {
        Self {
            id: 0, // Set by the database
            name,
            biography: None,
            profession: None,
            image: None,
        }
    }
}
