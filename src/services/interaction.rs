//! Interaction service
//!
//! Business logic for likes and follows. Each successful interaction adjusts
//! the denormalized counter on its target and, when the recipient's settings
//! allow it, creates a notification inline.

use crate::db::repositories::{
    ArticleRepository, InsertOutcome, InteractionRepository, NotificationRepository,
    ProfileRepository,
};
use crate::models::{Interaction, InteractionKind, Notification, TargetKind, User, UserProfile};
use anyhow::Context;
use std::sync::Arc;

/// Error types for interaction service operations
#[derive(Debug, thiserror::Error)]
pub enum InteractionServiceError {
    /// Target not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (duplicate or self-targeted interaction)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Interaction service
pub struct InteractionService {
    interaction_repo: Arc<dyn InteractionRepository>,
    article_repo: Arc<dyn ArticleRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
}

impl InteractionService {
    pub fn new(
        interaction_repo: Arc<dyn InteractionRepository>,
        article_repo: Arc<dyn ArticleRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            interaction_repo,
            article_repo,
            profile_repo,
            notification_repo,
        }
    }

    /// Record a like on an article.
    ///
    /// Duplicate likes are rejected; the unique constraint decides, so two
    /// concurrent first likes cannot both count.
    pub async fn like_article(
        &self,
        user: &User,
        article_id: i64,
    ) -> Result<(), InteractionServiceError> {
        let article = self
            .article_repo
            .get_by_id(article_id)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| InteractionServiceError::NotFound("Article not found".to_string()))?;

        let outcome = self
            .interaction_repo
            .insert(&Interaction::new(
                user.id,
                TargetKind::Article,
                article_id,
                InteractionKind::Like,
            ))
            .await
            .context("Failed to record like")?;

        if outcome == InsertOutcome::Duplicate {
            return Err(InteractionServiceError::ValidationError(
                "You have already liked this article".to_string(),
            ));
        }

        self.article_repo
            .adjust_like_count(article_id, 1)
            .await
            .context("Failed to adjust like count")?;

        if let Some(author_profile_id) = article.author_profile_id {
            self.notify_author_of_like(user, author_profile_id, &article.title)
                .await?;
        }

        tracing::debug!(user_id = user.id, article_id, "article liked");
        Ok(())
    }

    /// Remove a like from an article.
    pub async fn unlike_article(
        &self,
        user: &User,
        article_id: i64,
    ) -> Result<(), InteractionServiceError> {
        if self
            .article_repo
            .get_by_id(article_id)
            .await
            .context("Failed to get article")?
            .is_none()
        {
            return Err(InteractionServiceError::NotFound(
                "Article not found".to_string(),
            ));
        }

        let removed = self
            .interaction_repo
            .remove(
                user.id,
                TargetKind::Article,
                article_id,
                InteractionKind::Like,
            )
            .await
            .context("Failed to remove like")?;

        if !removed {
            return Err(InteractionServiceError::ValidationError(
                "You have not liked this article".to_string(),
            ));
        }

        self.article_repo
            .adjust_like_count(article_id, -1)
            .await
            .context("Failed to adjust like count")?;
        Ok(())
    }

    /// Follow a user by username.
    pub async fn follow_profile(
        &self,
        user: &User,
        username: &str,
    ) -> Result<(), InteractionServiceError> {
        let target = self.target_profile(username).await?;

        if target.user_id == user.id {
            return Err(InteractionServiceError::ValidationError(
                "You cannot follow yourself".to_string(),
            ));
        }

        let outcome = self
            .interaction_repo
            .insert(&Interaction::new(
                user.id,
                TargetKind::Profile,
                target.id,
                InteractionKind::Follow,
            ))
            .await
            .context("Failed to record follow")?;

        if outcome == InsertOutcome::Duplicate {
            return Err(InteractionServiceError::ValidationError(format!(
                "You are already following '{}'",
                username
            )));
        }

        self.profile_repo
            .adjust_follow_count(target.id, 1)
            .await
            .context("Failed to adjust follow count")?;

        if self.wants(&target, InteractionKind::Follow).await? {
            self.notification_repo
                .create(&Notification::new(
                    target.user_id,
                    format!("{} started following you", user.username),
                    InteractionKind::Follow,
                ))
                .await
                .context("Failed to create follow notification")?;
        }

        tracing::debug!(user_id = user.id, target_profile = target.id, "profile followed");
        Ok(())
    }

    /// Unfollow a user by username.
    pub async fn unfollow_profile(
        &self,
        user: &User,
        username: &str,
    ) -> Result<(), InteractionServiceError> {
        let target = self.target_profile(username).await?;

        let removed = self
            .interaction_repo
            .remove(
                user.id,
                TargetKind::Profile,
                target.id,
                InteractionKind::Follow,
            )
            .await
            .context("Failed to remove follow")?;

        if !removed {
            return Err(InteractionServiceError::ValidationError(format!(
                "You are not following '{}'",
                username
            )));
        }

        self.profile_repo
            .adjust_follow_count(target.id, -1)
            .await
            .context("Failed to adjust follow count")?;
        Ok(())
    }

    async fn target_profile(
        &self,
        username: &str,
    ) -> Result<UserProfile, InteractionServiceError> {
        self.profile_repo
            .get_by_username(username)
            .await
            .context("Failed to get profile")?
            .ok_or_else(|| {
                InteractionServiceError::NotFound(format!("No profile for user '{}'", username))
            })
    }

    async fn notify_author_of_like(
        &self,
        liker: &User,
        author_profile_id: i64,
        title: &str,
    ) -> Result<(), InteractionServiceError> {
        let Some(author) = self
            .profile_repo
            .get_by_id(author_profile_id)
            .await
            .context("Failed to get author profile")?
        else {
            return Ok(());
        };

        // No notification for liking your own article
        if author.user_id == liker.id || !author.is_author {
            return Ok(());
        }

        if self.wants(&author, InteractionKind::Like).await? {
            self.notification_repo
                .create(&Notification::new(
                    author.user_id,
                    format!("{} liked your article \"{}\"", liker.username, title),
                    InteractionKind::Like,
                ))
                .await
                .context("Failed to create like notification")?;
        }
        Ok(())
    }

    /// Whether the recipient's settings allow a notification for `kind`.
    /// Missing settings count as all-enabled, matching the defaults.
    async fn wants(
        &self,
        profile: &UserProfile,
        kind: InteractionKind,
    ) -> Result<bool, InteractionServiceError> {
        let settings = self
            .notification_repo
            .get_settings(profile.id)
            .await
            .context("Failed to get notification settings")?;

        Ok(match settings {
            Some(s) => match kind {
                InteractionKind::Like => s.notify_on_like,
                InteractionKind::Follow => s.notify_on_new_follower,
            },
            None => true,
        })
    }
}
