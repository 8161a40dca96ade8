//! Author repository
//!
//! Database operations for the standalone author directory.

use crate::models::Author;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Author repository trait
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Create a new author entry
    async fn create(&self, author: &Author) -> Result<Author>;

    /// Get author by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Author>>;

    /// List authors ordered by name
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Author>>;

    /// Count all authors
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based author repository implementation
pub struct SqlxAuthorRepository {
    pool: SqlitePool,
}

impl SqlxAuthorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn AuthorRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_author(row: &sqlx::sqlite::SqliteRow) -> Author {
    Author {
        id: row.get("id"),
        name: row.get("name"),
        biography: row.get("biography"),
        profession: row.get("profession"),
        image: row.get("image"),
    }
}

#[async_trait]
impl AuthorRepository for SqlxAuthorRepository {
    async fn create(&self, author: &Author) -> Result<Author> {
        let result = sqlx::query(
            "INSERT INTO authors (name, biography, profession, image) VALUES (?, ?, ?, ?)",
        )
        .bind(&author.name)
        .bind(&author.biography)
        .bind(&author.profession)
        .bind(&author.image)
        .execute(&self.pool)
        .await
        .context("Failed to create author")?;

        let mut created = author.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Author>> {
        let row = sqlx::query(
            "SELECT id, name, biography, profession, image FROM authors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get author by ID")?;

        Ok(row.as_ref().map(row_to_author))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Author>> {
        let rows = sqlx::query(
            "SELECT id, name, biography, profession, image FROM authors ORDER BY name LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list authors")?;

        Ok(rows.iter().map(row_to_author).collect())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM authors")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count authors")?;
        Ok(row.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxAuthorRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxAuthorRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_author() {
        let repo = setup().await;
        let mut author = Author::new("Ursula Vernon".to_string());
        author.profession = Some("Novelist".to_string());

        let created = repo.create(&author).await.unwrap();
        assert!(created.id > 0);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Ursula Vernon");
        assert_eq!(fetched.profession.as_deref(), Some("Novelist"));
        assert!(fetched.biography.is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let repo = setup().await;
        repo.create(&Author::new("Zadie".to_string())).await.unwrap();
        repo.create(&Author::new("Amos".to_string())).await.unwrap();

        let authors = repo.list(0, 10).await.unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].name, "Amos");
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
