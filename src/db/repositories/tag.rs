//! Tag repository
//!
//! Database operations for tags and the article-tag junction table.

use crate::models::{Tag, TagWithCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, name: &str) -> Result<Tag>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get tag by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// Get an existing tag by name or create it
    async fn get_or_create(&self, name: &str) -> Result<Tag>;

    /// List all tags with the number of published articles carrying each
    async fn list_with_counts(&self) -> Result<Vec<TagWithCount>>;

    /// Tags attached to an article, ordered by name
    async fn get_by_article_id(&self, article_id: i64) -> Result<Vec<Tag>>;

    /// Replace an article's tag set
    async fn set_article_tags(&self, article_id: i64, tag_ids: &[i64]) -> Result<()>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: SqlitePool,
}

impl SqlxTagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, name: &str) -> Result<Tag> {
        let result = sqlx::query("INSERT INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .context("Failed to create tag")?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by ID")?;

        Ok(row.as_ref().map(row_to_tag))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by name")?;

        Ok(row.as_ref().map(row_to_tag))
    }

    async fn get_or_create(&self, name: &str) -> Result<Tag> {
        if let Some(tag) = self.get_by_name(name).await? {
            return Ok(tag);
        }
        self.create(name).await
    }

    async fn list_with_counts(&self) -> Result<Vec<TagWithCount>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name,
                   COUNT(CASE WHEN a.visibility = 'published' THEN 1 END) AS article_count
            FROM tags t
            LEFT JOIN article_tags at ON at.tag_id = t.id
            LEFT JOIN articles a ON a.id = at.article_id
            GROUP BY t.id, t.name
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list tags with counts")?;

        Ok(rows
            .iter()
            .map(|row| TagWithCount {
                id: row.get("id"),
                name: row.get("name"),
                article_count: row.get("article_count"),
            })
            .collect())
    }

    async fn get_by_article_id(&self, article_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name
            FROM tags t
            JOIN article_tags at ON at.tag_id = t.id
            WHERE at.article_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get article tags")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn set_article_tags(&self, article_id: i64, tag_ids: &[i64]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM article_tags WHERE article_id = ?")
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear article tags")?;

        for tag_id in tag_ids {
            sqlx::query("INSERT INTO article_tags (article_id, tag_id) VALUES (?, ?)")
                .bind(article_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .context("Failed to attach tag")?;
        }

        tx.commit().await.context("Failed to commit tag update")?;
        Ok(())
    }
}
