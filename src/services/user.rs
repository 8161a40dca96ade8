//! User service
//!
//! Business logic for accounts and authentication:
//! - Registration (creates the profile and default notification settings)
//! - Login with username or email, logout
//! - Session validation
//! - Account management (list, update, delete)

use crate::db::repositories::{
    NotificationRepository, ProfileRepository, SessionRepository, UserRepository,
};
use crate::models::{
    CreateUserInput, ListParams, NotificationSettings, PagedResult, Session, UpdateUserInput, User,
    UserProfile,
};
use crate::services::password::{hash_password, verify_password};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Default session expiration time in days
const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// User not found
    #[error("User not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for managing accounts and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    session_ttl_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            profile_repo,
            notification_repo,
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
        }
    }

    /// Create a new user service with custom session expiration
    pub fn with_session_ttl(mut self, days: i64) -> Self {
        self.session_ttl_days = days;
        self
    }

    /// Register a new user.
    ///
    /// Creates the account, an empty profile and default notification
    /// settings in one go.
    ///
    /// # Errors
    ///
    /// - `ValidationError` for empty fields or a malformed email
    /// - `UserExists` when the username or email is already taken
    pub async fn register(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        self.validate_register_input(&input)?;

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let mut user = User::new(input.username, input.email, password_hash);
        user.first_name = input.first_name;
        user.last_name = input.last_name;

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        // Every account gets a profile and default notification settings
        let profile = self
            .profile_repo
            .create(&UserProfile::new(created.id))
            .await
            .context("Failed to create profile")?;
        self.notification_repo
            .create_settings(&NotificationSettings::new(profile.id))
            .await
            .context("Failed to create notification settings")?;

        tracing::info!(user_id = created.id, username = %created.username, "user registered");
        Ok(created)
    }

    /// Login with username or email and password.
    ///
    /// Returns a new session on success. Invalid credentials and inactive
    /// accounts yield the same generic authentication error.
    pub async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<Session, UserServiceError> {
        let user = self
            .find_by_username_or_email(username_or_email)
            .await?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError("Invalid username or password".to_string())
            })?;

        let password_valid =
            verify_password(password, &user.password_hash).context("Failed to verify password")?;
        if !password_valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        if !user.is_active {
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        let session = self
            .session_repo
            .create(&Session::new(user.id, self.session_ttl_days))
            .await
            .context("Failed to create session")?;

        tracing::debug!(user_id = user.id, "user logged in");
        Ok(session)
    }

    /// Logout (invalidate session)
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Validate a session token and return the associated user.
    ///
    /// Expired sessions are deleted on sight and treated as absent.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            let _ = self.session_repo.delete(token).await;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user.filter(|u| u.is_active))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        self.user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")
            .map_err(Into::into)
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        self.user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")
            .map_err(Into::into)
    }

    /// List users, paginated
    pub async fn list(&self, params: ListParams) -> Result<PagedResult<User>, UserServiceError> {
        let total = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?;
        let params = params.clamped_to(total);
        let users = self
            .user_repo
            .list(params.offset(), params.limit())
            .await
            .context("Failed to list users")?;

        Ok(PagedResult::new(users, total, &params))
    }

    /// Apply a partial update to a user account.
    ///
    /// A new password is re-hashed; other unset fields are left unchanged.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<User, UserServiceError> {
        let mut user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound)?;

        if let Some(email) = input.email {
            if email.trim().is_empty() || !email.contains('@') {
                return Err(UserServiceError::ValidationError(
                    "Invalid email format".to_string(),
                ));
            }
            if let Some(existing) = self
                .user_repo
                .get_by_email(&email)
                .await
                .context("Failed to check email")?
            {
                if existing.id != id {
                    return Err(UserServiceError::UserExists(format!(
                        "Email '{}' is already registered",
                        email
                    )));
                }
            }
            user.email = email;
        }
        if let Some(password) = input.password {
            if password.is_empty() {
                return Err(UserServiceError::ValidationError(
                    "Password cannot be empty".to_string(),
                ));
            }
            user.password_hash =
                hash_password(&password).context("Failed to hash password")?;
        }
        if let Some(first_name) = input.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            user.last_name = last_name;
        }
        if let Some(is_active) = input.is_active {
            user.is_active = is_active;
        }

        self.user_repo
            .update(&user)
            .await
            .context("Failed to update user")?;

        Ok(user)
    }

    /// Delete a user account and its sessions.
    pub async fn delete(&self, id: i64) -> Result<(), UserServiceError> {
        if self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .is_none()
        {
            return Err(UserServiceError::NotFound);
        }

        self.session_repo
            .delete_by_user(id)
            .await
            .context("Failed to delete user sessions")?;
        self.user_repo
            .delete(id)
            .await
            .context("Failed to delete user")?;

        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        self.session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")
            .map_err(Into::into)
    }

    fn validate_register_input(&self, input: &CreateUserInput) -> Result<(), UserServiceError> {
        if input.username.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if input.email.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Email cannot be empty".to_string(),
            ));
        }
        if input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }
        if !input.email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "Invalid email format".to_string(),
            ));
        }
        Ok(())
    }

    async fn find_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        if let Some(user) = self
            .user_repo
            .get_by_username(username_or_email)
            .await
            .context("Failed to get user by username")?
        {
            return Ok(Some(user));
        }

        self.user_repo
            .get_by_email(username_or_email)
            .await
            .context("Failed to get user by email")
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxNotificationRepository, SqlxProfileRepository, SqlxSessionRepository,
        SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, UserService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            SqlxProfileRepository::boxed(pool.clone()),
            SqlxNotificationRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    fn register_input(name: &str) -> CreateUserInput {
        CreateUserInput {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password: "password123".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_profile_and_settings() {
        let (pool, service) = setup().await;
        let user = service.register(register_input("ana")).await.unwrap();

        let profiles = SqlxProfileRepository::new(pool.clone());
        use crate::db::repositories::ProfileRepository as _;
        let profile = profiles.get_by_user_id(user.id).await.unwrap().unwrap();
        assert!(!profile.is_author);

        let notifications = SqlxNotificationRepository::new(pool);
        use crate::db::repositories::NotificationRepository as _;
        let settings = notifications
            .get_settings(profile.id)
            .await
            .unwrap()
            .unwrap();
        assert!(settings.notify_on_like);
    }

    #[tokio::test]
    async fn test_register_duplicate_username_fails() {
        let (_pool, service) = setup().await;
        service.register(register_input("dup")).await.unwrap();

        let mut second = register_input("dup");
        second.email = "other@example.com".to_string();
        let result = service.register(second).await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_fails() {
        let (_pool, service) = setup().await;
        service.register(register_input("first")).await.unwrap();

        let mut second = register_input("second");
        second.email = "first@example.com".to_string();
        let result = service.register(second).await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_register_invalid_email_fails() {
        let (_pool, service) = setup().await;
        let mut input = register_input("badmail");
        input.email = "not-an-email".to_string();
        let result = service.register(input).await;
        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_login_with_username_and_email() {
        let (_pool, service) = setup().await;
        service.register(register_input("dual")).await.unwrap();

        let by_name = service.login("dual", "password123").await.unwrap();
        assert!(!by_name.is_expired());

        let by_email = service
            .login("dual@example.com", "password123")
            .await
            .unwrap();
        assert_ne!(by_name.id, by_email.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password_fails() {
        let (_pool, service) = setup().await;
        service.register(register_input("victim")).await.unwrap();

        let result = service.login("victim", "wrongpassword").await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_login_inactive_account_fails() {
        let (_pool, service) = setup().await;
        let user = service.register(register_input("gone")).await.unwrap();
        service
            .update(
                user.id,
                UpdateUserInput {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = service.login("gone", "password123").await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn test_session_round_trip_and_logout() {
        let (_pool, service) = setup().await;
        let registered = service.register(register_input("sess")).await.unwrap();
        let session = service.login("sess", "password123").await.unwrap();

        let user = service
            .validate_session(&session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, registered.id);

        service.logout(&session.id).await.unwrap();
        assert!(service
            .validate_session(&session.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let service = UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            SqlxProfileRepository::boxed(pool.clone()),
            SqlxNotificationRepository::boxed(pool.clone()),
        )
        .with_session_ttl(-1);

        service.register(register_input("late")).await.unwrap();
        let session = service.login("late", "password123").await.unwrap();
        assert!(session.is_expired());
        assert!(service
            .validate_session(&session.id)
            .await
            .unwrap()
            .is_none());

        assert_eq!(service.cleanup_expired_sessions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_rehashes_password() {
        let (_pool, service) = setup().await;
        let user = service.register(register_input("rotate")).await.unwrap();

        service
            .update(
                user.id,
                UpdateUserInput {
                    password: Some("newpassword".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(service.login("rotate", "password123").await.is_err());
        assert!(service.login("rotate", "newpassword").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_duplicate_email_rejected() {
        let (_pool, service) = setup().await;
        service.register(register_input("holder")).await.unwrap();
        let other = service.register(register_input("other")).await.unwrap();

        let result = service
            .update(
                other.id,
                UpdateUserInput {
                    email: Some("holder@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let (_pool, service) = setup().await;
        assert!(matches!(
            service.delete(999).await,
            Err(UserServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_paginated() {
        let (_pool, service) = setup().await;
        for i in 0..5 {
            service
                .register(register_input(&format!("user{}", i)))
                .await
                .unwrap();
        }

        let page = service.list(ListParams::new(2, 2)).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages(), 3);
    }
}
