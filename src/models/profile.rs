//! User profile model
//!
//! A profile extends a user account with presentational data and the author
//! flag. Every registered user gets exactly one profile.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fallback avatar path used when no avatar has been set.
pub const DEFAULT_AVATAR: &str = "profile_pics/default-neutral-avatar.png";

/// User profile entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique identifier
    pub id: i64,
    /// Owning user ID (one profile per user)
    pub user_id: i64,
    /// Short biography (max 500 characters)
    pub bio: String,
    /// Location (max 30 characters)
    pub location: String,
    /// Birth date
    pub birth_date: Option<NaiveDate>,
    /// Avatar image path or URL
    pub avatar: Option<String>,
    /// Gender
    pub gender: Gender,
    /// Whether this profile can be credited as an article author
    pub is_author: bool,
    /// Number of followers
    pub follow_count: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Create an empty profile for `user_id`.
    pub fn new(user_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by the database
            user_id,
            bio: String::new(),
            location: String::new(),
            birth_date: None,
            avatar: None,
            gender: Gender::Unspecified,
            is_author: false,
            follow_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// The avatar to display, falling back to the default image.
    pub fn avatar_or_default(&self) -> &str {
        self.avatar.as_deref().unwrap_or(DEFAULT_AVATAR)
    }
}

/// Profile gender field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    M,
    F,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Gender {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
            Gender::Unspecified => "",
        }
    }

    /// Parse from the database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "M" => Some(Gender::M),
            "F" => Some(Gender::F),
            "" => Some(Gender::Unspecified),
            _ => None,
        }
    }
}

/// Input for a partial profile update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileInput {
    pub bio: Option<String>,
    pub location: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub gender: Option<Gender>,
}

impl UpdateProfileInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.bio.is_some()
            || self.location.is_some()
            || self.birth_date.is_some()
            || self.avatar.is_some()
            || self.gender.is_some()
    }
}
