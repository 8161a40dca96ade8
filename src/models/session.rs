//! Session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated session backed by a row in the `sessions` table.
///
/// The session id doubles as the bearer token handed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session token
    pub id: String,
    /// Owning user
    pub user_id: i64,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session for `user_id` valid for `ttl_days` days.
    pub fn new(user_id: i64, ttl_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().simple().to_string(),
            user_id,
            expires_at: now + Duration::days(ttl_days),
            created_at: now,
        }
    }

    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_not_expired() {
        let session = Session::new(1, 7);
        assert!(!session.is_expired());
        assert_eq!(session.user_id, 1);
        assert_eq!(session.id.len(), 32);
    }

    #[test]
    fn test_expired_session() {
        let mut session = Session::new(1, 7);
        session.expires_at = Utc::now() - Duration::seconds(1);
        assert!(session.is_expired());
    }

    #[test]
    fn test_session_tokens_are_unique() {
        let a = Session::new(1, 7);
        let b = Session::new(1, 7);
        assert_ne!(a.id, b.id);
    }
}
