//! Theme repository
//!
//! Database operations for article themes.

use crate::models::ArticleTheme;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Theme repository trait
#[async_trait]
pub trait ThemeRepository: Send + Sync {
    /// Create a new theme
    async fn create(&self, name: &str) -> Result<ArticleTheme>;

    /// Get theme by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<ArticleTheme>>;

    /// Get theme by name
    async fn get_by_name(&self, name: &str) -> Result<Option<ArticleTheme>>;

    /// Get an existing theme by name or create it
    async fn get_or_create(&self, name: &str) -> Result<ArticleTheme>;

    /// List themes ordered by name
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ArticleTheme>>;

    /// Count all themes
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based theme repository implementation
pub struct SqlxThemeRepository {
    pool: SqlitePool,
}

impl SqlxThemeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ThemeRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ThemeRepository for SqlxThemeRepository {
    async fn create(&self, name: &str) -> Result<ArticleTheme> {
        let result = sqlx::query("INSERT INTO article_themes (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .context("Failed to create theme")?;

        Ok(ArticleTheme {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ArticleTheme>> {
        let row = sqlx::query("SELECT id, name FROM article_themes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get theme by ID")?;

        Ok(row.map(|row| ArticleTheme {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<ArticleTheme>> {
        let row = sqlx::query("SELECT id, name FROM article_themes WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get theme by name")?;

        Ok(row.map(|row| ArticleTheme {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    async fn get_or_create(&self, name: &str) -> Result<ArticleTheme> {
        if let Some(theme) = self.get_by_name(name).await? {
            return Ok(theme);
        }
        self.create(name).await
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ArticleTheme>> {
        let rows = sqlx::query("SELECT id, name FROM article_themes ORDER BY name LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list themes")?;

        Ok(rows
            .iter()
            .map(|row| ArticleTheme {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM article_themes")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count themes")?;
        Ok(row.get("count"))
    }
}
