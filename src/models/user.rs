//! User model
//!
//! Defines the User account entity. The user carries authentication data and
//! the staff flag; everything presentational lives in `UserProfile`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Staff flag: staff users can manage other accounts
    pub is_staff: bool,
    /// Active flag: inactive users cannot log in
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by the database
            username,
            email,
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this user may view or edit the account with `user_id`.
    ///
    /// Staff users can access any account; others only their own.
    pub fn can_access(&self, user_id: i64) -> bool {
        self.is_staff || self.id == user_id
    }
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    /// Plaintext password (will be hashed)
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Input for updating a user
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub email: Option<String>,
    /// New plaintext password (will be hashed)
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(id: i64, is_staff: bool) -> User {
        let mut user = User::new(
            format!("user{}", id),
            format!("user{}@example.com", id),
            "hash".to_string(),
        );
        user.id = id;
        user.is_staff = is_staff;
        user
    }

    #[test]
    fn test_user_new_defaults() {
        let user = User::new(
            "maria".to_string(),
            "maria@example.com".to_string(),
            "hashed".to_string(),
        );
        assert_eq!(user.id, 0);
        assert!(!user.is_staff);
        assert!(user.is_active);
        assert_eq!(user.first_name, "");
    }

    #[test]
    fn test_staff_can_access_any_account() {
        let staff = make_user(1, true);
        assert!(staff.can_access(1));
        assert!(staff.can_access(2));
        assert!(staff.can_access(999));
    }

    #[test]
    fn test_regular_user_can_only_access_own_account() {
        let user = make_user(2, false);
        assert!(user.can_access(2));
        assert!(!user.can_access(1));
        assert!(!user.can_access(999));
    }
}
