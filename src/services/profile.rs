//! Profile service
//!
//! Business logic for user profiles: fetching the profile of the current
//! user or by username, and partial updates with field validation.

use crate::db::repositories::ProfileRepository;
use crate::models::{UpdateProfileInput, UserProfile};
use anyhow::Context;
use std::sync::Arc;

/// Maximum biography length in characters
const MAX_BIO_LENGTH: usize = 500;
/// Maximum location length in characters
const MAX_LOCATION_LENGTH: usize = 30;

/// Error types for profile service operations
#[derive(Debug, thiserror::Error)]
pub enum ProfileServiceError {
    /// Profile not found
    #[error("Profile not found")]
    NotFound,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Profile service
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        Self { repo }
    }

    /// Get the profile owned by a user
    pub async fn get_for_user(&self, user_id: i64) -> Result<UserProfile, ProfileServiceError> {
        self.repo
            .get_by_user_id(user_id)
            .await
            .context("Failed to get profile")?
            .ok_or(ProfileServiceError::NotFound)
    }

    /// Get profile by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<UserProfile>, ProfileServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get profile")
            .map_err(Into::into)
    }

    /// Get a profile through the owning user's username
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, ProfileServiceError> {
        self.repo
            .get_by_username(username)
            .await
            .context("Failed to get profile by username")
            .map_err(Into::into)
    }

    /// Apply a partial update to a user's profile.
    ///
    /// Unset fields keep their current values.
    pub async fn update(
        &self,
        user_id: i64,
        input: UpdateProfileInput,
    ) -> Result<UserProfile, ProfileServiceError> {
        let mut profile = self.get_for_user(user_id).await?;

        if let Some(bio) = input.bio {
            if bio.chars().count() > MAX_BIO_LENGTH {
                return Err(ProfileServiceError::ValidationError(format!(
                    "Bio must be at most {} characters",
                    MAX_BIO_LENGTH
                )));
            }
            profile.bio = bio;
        }
        if let Some(location) = input.location {
            if location.chars().count() > MAX_LOCATION_LENGTH {
                return Err(ProfileServiceError::ValidationError(format!(
                    "Location must be at most {} characters",
                    MAX_LOCATION_LENGTH
                )));
            }
            profile.location = location;
        }
        if let Some(birth_date) = input.birth_date {
            profile.birth_date = Some(birth_date);
        }
        if let Some(avatar) = input.avatar {
            profile.avatar = Some(avatar);
        }
        if let Some(gender) = input.gender {
            profile.gender = gender;
        }

        self.repo
            .update(&profile)
            .await
            .context("Failed to update profile")?;

        Ok(profile)
    }

    /// Mark a profile as an author byline candidate.
    pub async fn set_author_flag(
        &self,
        user_id: i64,
        is_author: bool,
    ) -> Result<UserProfile, ProfileServiceError> {
        let mut profile = self.get_for_user(user_id).await?;
        profile.is_author = is_author;
        self.repo
            .update(&profile)
            .await
            .context("Failed to update profile")?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        ProfileRepository as _, SqlxProfileRepository, SqlxUserRepository, UserRepository as _,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Gender, User};

    async fn setup() -> (ProfileService, i64) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let users = SqlxUserRepository::new(pool.clone());
        let user = users
            .create(&User::new(
                "pia".to_string(),
                "pia@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();

        let profiles = SqlxProfileRepository::new(pool.clone());
        profiles
            .create(&UserProfile::new(user.id))
            .await
            .unwrap();

        (ProfileService::new(SqlxProfileRepository::boxed(pool)), user.id)
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let (service, user_id) = setup().await;
        service
            .update(
                user_id,
                UpdateProfileInput {
                    bio: Some("Hello".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let profile = service
            .update(
                user_id,
                UpdateProfileInput {
                    gender: Some(Gender::F),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.bio, "Hello");
        assert_eq!(profile.gender, Gender::F);
    }

    #[tokio::test]
    async fn test_bio_length_limit() {
        let (service, user_id) = setup().await;
        let result = service
            .update(
                user_id,
                UpdateProfileInput {
                    bio: Some("x".repeat(501)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(ProfileServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_location_length_limit() {
        let (service, user_id) = setup().await;
        let result = service
            .update(
                user_id,
                UpdateProfileInput {
                    location: Some("y".repeat(31)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(ProfileServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let (service, _) = setup().await;
        let result = service.get_for_user(999).await;
        assert!(matches!(result, Err(ProfileServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_set_author_flag() {
        let (service, user_id) = setup().await;
        let profile = service.set_author_flag(user_id, true).await.unwrap();
        assert!(profile.is_author);
    }
}
