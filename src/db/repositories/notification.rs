//! Notification repository
//!
//! Database operations for notifications and per-profile notification
//! settings.

use crate::models::{InteractionKind, Notification, NotificationSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Notification repository trait
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Create a notification
    async fn create(&self, notification: &Notification) -> Result<Notification>;

    /// A user's notifications, newest first
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Notification>>;

    /// Mark a notification read if it belongs to the user; reports whether
    /// a row was updated
    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool>;

    /// Create default settings for a profile
    async fn create_settings(&self, settings: &NotificationSettings) -> Result<NotificationSettings>;

    /// Settings for a profile
    async fn get_settings(&self, profile_id: i64) -> Result<Option<NotificationSettings>>;

    /// Persist settings flags
    async fn update_settings(&self, settings: &NotificationSettings) -> Result<()>;
}

/// SQLx-based notification repository implementation
pub struct SqlxNotificationRepository {
    pool: SqlitePool,
}

impl SqlxNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn NotificationRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> Notification {
    let kind: String = row.get("interaction_kind");
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        message: row.get("message"),
        interaction_kind: InteractionKind::from_str(&kind).unwrap_or(InteractionKind::Like),
        read: row.get("read"),
        created_at: row.get("created_at"),
    }
}

fn row_to_settings(row: &sqlx::sqlite::SqliteRow) -> NotificationSettings {
    NotificationSettings {
        id: row.get("id"),
        profile_id: row.get("profile_id"),
        notify_on_like: row.get("notify_on_like"),
        notify_on_comment: row.get("notify_on_comment"),
        notify_on_new_follower: row.get("notify_on_new_follower"),
        notify_on_milestone: row.get("notify_on_milestone"),
    }
}

#[async_trait]
impl NotificationRepository for SqlxNotificationRepository {
    async fn create(&self, notification: &Notification) -> Result<Notification> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, message, interaction_kind, read, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(notification.user_id)
        .bind(&notification.message)
        .bind(notification.interaction_kind.as_str())
        .bind(notification.read)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create notification")?;

        let mut created = notification.clone();
        created.id = result.last_insert_rowid();
        created.created_at = now;
        Ok(created)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, message, interaction_kind, read, created_at
            FROM notifications WHERE user_id = ? ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list notifications")?;

        Ok(rows.iter().map(row_to_notification).collect())
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to mark notification read")?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_settings(
        &self,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings> {
        let result = sqlx::query(
            r#"
            INSERT INTO notification_settings (profile_id, notify_on_like, notify_on_comment, notify_on_new_follower, notify_on_milestone)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(settings.profile_id)
        .bind(settings.notify_on_like)
        .bind(settings.notify_on_comment)
        .bind(settings.notify_on_new_follower)
        .bind(settings.notify_on_milestone)
        .execute(&self.pool)
        .await
        .context("Failed to create notification settings")?;

        let mut created = settings.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_settings(&self, profile_id: i64) -> Result<Option<NotificationSettings>> {
        let row = sqlx::query(
            r#"
            SELECT id, profile_id, notify_on_like, notify_on_comment, notify_on_new_follower, notify_on_milestone
            FROM notification_settings WHERE profile_id = ?
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get notification settings")?;

        Ok(row.as_ref().map(row_to_settings))
    }

    async fn update_settings(&self, settings: &NotificationSettings) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE notification_settings
            SET notify_on_like = ?, notify_on_comment = ?, notify_on_new_follower = ?, notify_on_milestone = ?
            WHERE profile_id = ?
            "#,
        )
        .bind(settings.notify_on_like)
        .bind(settings.notify_on_comment)
        .bind(settings.notify_on_new_follower)
        .bind(settings.notify_on_milestone)
        .bind(settings.profile_id)
        .execute(&self.pool)
        .await
        .context("Failed to update notification settings")?;
        Ok(())
    }
}
