//! Category repository
//!
//! Database operations for categories and the article-category junction table.

use crate::models::{Category, CategoryWithCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, name: &str) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Category>>;

    /// Get an existing category by name or create it
    async fn get_or_create(&self, name: &str) -> Result<Category>;

    /// List all categories with the number of published articles in each
    async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>>;

    /// Categories attached to an article, ordered by name
    async fn get_by_article_id(&self, article_id: i64) -> Result<Vec<Category>>;

    /// Replace an article's category set
    async fn set_article_categories(&self, article_id: i64, category_ids: &[i64]) -> Result<()>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, name: &str) -> Result<Category> {
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .context("Failed to create category")?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by ID")?;

        Ok(row.as_ref().map(row_to_category))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by name")?;

        Ok(row.as_ref().map(row_to_category))
    }

    async fn get_or_create(&self, name: &str) -> Result<Category> {
        if let Some(category) = self.get_by_name(name).await? {
            return Ok(category);
        }
        self.create(name).await
    }

    async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name,
                   COUNT(CASE WHEN a.visibility = 'published' THEN 1 END) AS post_count
            FROM categories c
            LEFT JOIN article_categories ac ON ac.category_id = c.id
            LEFT JOIN articles a ON a.id = ac.article_id
            GROUP BY c.id, c.name
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories with counts")?;

        Ok(rows
            .iter()
            .map(|row| CategoryWithCount {
                id: row.get("id"),
                name: row.get("name"),
                post_count: row.get("post_count"),
            })
            .collect())
    }

    async fn get_by_article_id(&self, article_id: i64) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name
            FROM categories c
            JOIN article_categories ac ON ac.category_id = c.id
            WHERE ac.article_id = ?
            ORDER BY c.name
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get article categories")?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn set_article_categories(&self, article_id: i64, category_ids: &[i64]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM article_categories WHERE article_id = ?")
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear article categories")?;

        for category_id in category_ids {
            sqlx::query("INSERT INTO article_categories (article_id, category_id) VALUES (?, ?)")
                .bind(article_id)
                .bind(category_id)
                .execute(&mut *tx)
                .await
                .context("Failed to attach category")?;
        }

        tx.commit()
            .await
            .context("Failed to commit category update")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{ArticleRepository, SqlxArticleRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::Article;

    async fn setup() -> (SqlxCategoryRepository, SqlitePool) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        (SqlxCategoryRepository::new(pool.clone()), pool)
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_existing() {
        let (repo, _pool) = setup().await;
        let first = repo.get_or_create("Opinion").await.unwrap();
        let second = repo.get_or_create("Opinion").await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_article_category_attachment() {
        let (repo, pool) = setup().await;
        let articles = SqlxArticleRepository::new(pool);
        let article = articles
            .create(&Article::new("Title".to_string(), "Body".to_string()))
            .await
            .unwrap();

        let cat = repo.create("Essays").await.unwrap();
        repo.set_article_categories(article.id, &[cat.id]).await.unwrap();

        let attached = repo.get_by_article_id(article.id).await.unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].name, "Essays");

        let counts = repo.list_with_counts().await.unwrap();
        assert_eq!(counts[0].post_count, 1);
    }
}
