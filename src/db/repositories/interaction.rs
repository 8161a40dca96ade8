//! Interaction repository
//!
//! Database operations for likes and follows. Uniqueness of
//! (user, target, kind) is a table constraint, so a duplicate insert fails
//! at the database instead of racing a read-then-write check.

use crate::models::{Interaction, InteractionKind, TargetKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Outcome of an interaction insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row was inserted
    Created,
    /// An identical interaction already existed
    Duplicate,
}

/// Interaction repository trait
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    /// Insert an interaction, reporting whether it already existed
    async fn insert(&self, interaction: &Interaction) -> Result<InsertOutcome>;

    /// Check whether an interaction exists
    async fn exists(
        &self,
        user_id: i64,
        target_kind: TargetKind,
        target_id: i64,
        kind: InteractionKind,
    ) -> Result<bool>;

    /// Remove an interaction, reporting whether a row was deleted
    async fn remove(
        &self,
        user_id: i64,
        target_kind: TargetKind,
        target_id: i64,
        kind: InteractionKind,
    ) -> Result<bool>;

    /// Count interactions of a kind against a target
    async fn count_for_target(
        &self,
        target_kind: TargetKind,
        target_id: i64,
        kind: InteractionKind,
    ) -> Result<i64>;
}

/// SQLx-based interaction repository implementation
pub struct SqlxInteractionRepository {
    pool: SqlitePool,
}

impl SqlxInteractionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn InteractionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl InteractionRepository for SqlxInteractionRepository {
    async fn insert(&self, interaction: &Interaction) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO interactions (user_id, target_kind, target_id, kind, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(interaction.user_id)
        .bind(interaction.target_kind.as_str())
        .bind(interaction.target_id)
        .bind(interaction.kind.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to insert interaction")?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Created)
        }
    }

    async fn exists(
        &self,
        user_id: i64,
        target_kind: TargetKind,
        target_id: i64,
        kind: InteractionKind,
    ) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM interactions
            WHERE user_id = ? AND target_kind = ? AND target_id = ? AND kind = ?
            "#,
        )
        .bind(user_id)
        .bind(target_kind.as_str())
        .bind(target_id)
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to check interaction")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn remove(
        &self,
        user_id: i64,
        target_kind: TargetKind,
        target_id: i64,
        kind: InteractionKind,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM interactions
            WHERE user_id = ? AND target_kind = ? AND target_id = ? AND kind = ?
            "#,
        )
        .bind(user_id)
        .bind(target_kind.as_str())
        .bind(target_id)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to remove interaction")?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_for_target(
        &self,
        target_kind: TargetKind,
        target_id: i64,
        kind: InteractionKind,
    ) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM interactions
            WHERE target_kind = ? AND target_id = ? AND kind = ?
            "#,
        )
        .bind(target_kind.as_str())
        .bind(target_id)
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to count interactions")?;

        Ok(row.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        ArticleRepository, SqlxArticleRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Article, User};

    async fn setup() -> (SqlxInteractionRepository, i64, i64) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let users = SqlxUserRepository::new(pool.clone());
        let user = users
            .create(&User::new(
                "reader".to_string(),
                "reader@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();

        let articles = SqlxArticleRepository::new(pool.clone());
        let article = articles
            .create(&Article::new("Liked".to_string(), "Body".to_string()))
            .await
            .unwrap();

        (SqlxInteractionRepository::new(pool), user.id, article.id)
    }

    #[tokio::test]
    async fn test_duplicate_like_reported_not_errored() {
        let (repo, user_id, article_id) = setup().await;
        let like = Interaction::new(user_id, TargetKind::Article, article_id, InteractionKind::Like);

        assert_eq!(repo.insert(&like).await.unwrap(), InsertOutcome::Created);
        assert_eq!(repo.insert(&like).await.unwrap(), InsertOutcome::Duplicate);
        assert_eq!(
            repo.count_for_target(TargetKind::Article, article_id, InteractionKind::Like)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_remove_reports_absence() {
        let (repo, user_id, article_id) = setup().await;
        let like = Interaction::new(user_id, TargetKind::Article, article_id, InteractionKind::Like);

        assert!(!repo
            .remove(user_id, TargetKind::Article, article_id, InteractionKind::Like)
            .await
            .unwrap());

        repo.insert(&like).await.unwrap();
        assert!(repo
            .remove(user_id, TargetKind::Article, article_id, InteractionKind::Like)
            .await
            .unwrap());
        assert!(!repo
            .exists(user_id, TargetKind::Article, article_id, InteractionKind::Like)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_same_target_different_kind_is_distinct() {
        let (repo, user_id, article_id) = setup().await;
        let like = Interaction::new(user_id, TargetKind::Article, article_id, InteractionKind::Like);
        let follow =
            Interaction::new(user_id, TargetKind::Article, article_id, InteractionKind::Follow);

        assert_eq!(repo.insert(&like).await.unwrap(), InsertOutcome::Created);
        assert_eq!(repo.insert(&follow).await.unwrap(), InsertOutcome::Created);
    }
}
