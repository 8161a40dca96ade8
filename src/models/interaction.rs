//! Interaction model
//!
//! A single table records both likes on articles and follows between users.
//! The target is addressed by an explicit (kind, id) pair rather than a
//! generic reference, and the combination of user, target and interaction
//! kind is unique at the database level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded user interaction (like or follow).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Unique identifier
    pub id: i64,
    /// The acting user
    pub user_id: i64,
    /// What kind of object the interaction targets
    pub target_kind: TargetKind,
    /// The targeted row id (article id or profile id)
    pub target_id: i64,
    /// Interaction kind
    pub kind: InteractionKind,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(user_id: i64, target_kind: TargetKind, target_id: i64, kind: InteractionKind) -> Self {
        Self {
            id: 0, // Set by the database
            user_id,
            target_kind,
            target_id,
            kind,
            created_at: Utc::now(),
        }
    }
}

/// Kind of object an interaction targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// An article (liked)
    Article,
    /// A user profile (followed)
    Profile,
}

impl TargetKind {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Article => "article",
            TargetKind::Profile => "profile",
        }
    }

    /// Parse from the database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "article" => Some(TargetKind::Article),
            "profile" => Some(TargetKind::Profile),
            _ => None,
        }
    }
}

/// Interaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Follow,
}

impl InteractionKind {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Follow => "follow",
        }
    }

    /// Parse from the database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "like" => Some(InteractionKind::Like),
            "follow" => Some(InteractionKind::Follow),
            _ => None,
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(InteractionKind::from_str("like"), Some(InteractionKind::Like));
        assert_eq!(InteractionKind::from_str("follow"), Some(InteractionKind::Follow));
        assert_eq!(InteractionKind::from_str("share"), None);
    }

    #[test]
    fn test_target_kind_round_trip() {
        for kind in [TargetKind::Article, TargetKind::Profile] {
            assert_eq!(TargetKind::from_str(kind.as_str()), Some(kind));
        }
    }
}
