//! Notification service
//!
//! Business logic for the notification inbox and per-user notification
//! preferences.

use crate::db::repositories::{NotificationRepository, ProfileRepository};
use crate::models::{Notification, NotificationSettings, UpdateNotificationSettingsInput};
use anyhow::Context;
use std::sync::Arc;

/// Error types for notification service operations
#[derive(Debug, thiserror::Error)]
pub enum NotificationServiceError {
    /// Notification or settings not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Notification service
pub struct NotificationService {
    notification_repo: Arc<dyn NotificationRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
}

impl NotificationService {
    pub fn new(
        notification_repo: Arc<dyn NotificationRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            notification_repo,
            profile_repo,
        }
    }

    /// A user's notifications, newest first
    pub async fn list_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<Notification>, NotificationServiceError> {
        self.notification_repo
            .list_by_user(user_id)
            .await
            .context("Failed to list notifications")
            .map_err(Into::into)
    }

    /// Mark a notification read. The notification must belong to the caller.
    pub async fn mark_read(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<(), NotificationServiceError> {
        let updated = self
            .notification_repo
            .mark_read(id, user_id)
            .await
            .context("Failed to mark notification read")?;

        if !updated {
            return Err(NotificationServiceError::NotFound(
                "Notification not found".to_string(),
            ));
        }
        Ok(())
    }

    /// The notification settings of a user, created lazily when absent.
    pub async fn settings_for_user(
        &self,
        user_id: i64,
    ) -> Result<NotificationSettings, NotificationServiceError> {
        let profile = self
            .profile_repo
            .get_by_user_id(user_id)
            .await
            .context("Failed to get profile")?
            .ok_or_else(|| NotificationServiceError::NotFound("Profile not found".to_string()))?;

        if let Some(settings) = self
            .notification_repo
            .get_settings(profile.id)
            .await
            .context("Failed to get notification settings")?
        {
            return Ok(settings);
        }

        // Accounts created before the settings table get defaults on demand
        self.notification_repo
            .create_settings(&NotificationSettings::new(profile.id))
            .await
            .context("Failed to create notification settings")
            .map_err(Into::into)
    }

    /// Merge the given flags into the user's settings (PATCH semantics).
    pub async fn merge_settings(
        &self,
        user_id: i64,
        input: UpdateNotificationSettingsInput,
    ) -> Result<NotificationSettings, NotificationServiceError> {
        let mut settings = self.settings_for_user(user_id).await?;
        input.apply(&mut settings);
        self.notification_repo
            .update_settings(&settings)
            .await
            .context("Failed to update notification settings")?;
        Ok(settings)
    }

    /// Replace the user's settings; flags missing from the input fall back
    /// to enabled (PUT semantics).
    pub async fn replace_settings(
        &self,
        user_id: i64,
        input: UpdateNotificationSettingsInput,
    ) -> Result<NotificationSettings, NotificationServiceError> {
        let current = self.settings_for_user(user_id).await?;
        let mut settings = NotificationSettings::new(current.profile_id);
        settings.id = current.id;
        input.apply(&mut settings);
        self.notification_repo
            .update_settings(&settings)
            .await
            .context("Failed to update notification settings")?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        NotificationRepository as _, ProfileRepository as _, SqlxNotificationRepository,
        SqlxProfileRepository, SqlxUserRepository, UserRepository as _,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{InteractionKind, User, UserProfile};
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, NotificationService, i64) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let users = SqlxUserRepository::new(pool.clone());
        let user = users
            .create(&User::new(
                "nia".to_string(),
                "nia@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();
        let profiles = SqlxProfileRepository::new(pool.clone());
        profiles.create(&UserProfile::new(user.id)).await.unwrap();

        let service = NotificationService::new(
            SqlxNotificationRepository::boxed(pool.clone()),
            SqlxProfileRepository::boxed(pool.clone()),
        );
        (pool, service, user.id)
    }

    #[tokio::test]
    async fn test_settings_created_lazily() {
        let (_pool, service, user_id) = setup().await;
        let settings = service.settings_for_user(user_id).await.unwrap();
        assert!(settings.notify_on_like);
        assert!(settings.id > 0);

        // Second call returns the same row
        let again = service.settings_for_user(user_id).await.unwrap();
        assert_eq!(again.id, settings.id);
    }

    #[tokio::test]
    async fn test_merge_keeps_unset_flags() {
        let (_pool, service, user_id) = setup().await;
        service
            .merge_settings(
                user_id,
                UpdateNotificationSettingsInput {
                    notify_on_like: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let settings = service
            .merge_settings(
                user_id,
                UpdateNotificationSettingsInput {
                    notify_on_milestone: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!settings.notify_on_like);
        assert!(!settings.notify_on_milestone);
        assert!(settings.notify_on_comment);
    }

    #[tokio::test]
    async fn test_replace_resets_unset_flags() {
        let (_pool, service, user_id) = setup().await;
        service
            .merge_settings(
                user_id,
                UpdateNotificationSettingsInput {
                    notify_on_like: Some(false),
                    notify_on_comment: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let settings = service
            .replace_settings(
                user_id,
                UpdateNotificationSettingsInput {
                    notify_on_comment: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // notify_on_like was not in the PUT body, so it reverts to enabled
        assert!(settings.notify_on_like);
        assert!(!settings.notify_on_comment);
    }

    #[tokio::test]
    async fn test_mark_read_foreign_notification_not_found() {
        let (pool, service, user_id) = setup().await;

        let notifications = SqlxNotificationRepository::new(pool);
        let created = notifications
            .create(&crate::models::Notification::new(
                user_id,
                "hi".to_string(),
                InteractionKind::Like,
            ))
            .await
            .unwrap();

        let result = service.mark_read(created.id, user_id + 1).await;
        assert!(matches!(result, Err(NotificationServiceError::NotFound(_))));

        service.mark_read(created.id, user_id).await.unwrap();
        let inbox = service.list_for_user(user_id).await.unwrap();
        assert!(inbox[0].read);
    }
}
