//! Category service
//!
//! Business logic for category listings and the articles within a category.

use crate::db::repositories::{ArticleRepository, CategoryRepository};
use crate::models::{Article, Category, CategoryWithCount, ListParams, PagedResult};
use anyhow::Context;
use std::sync::Arc;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service
pub struct CategoryService {
    category_repo: Arc<dyn CategoryRepository>,
    article_repo: Arc<dyn ArticleRepository>,
}

impl CategoryService {
    pub fn new(
        category_repo: Arc<dyn CategoryRepository>,
        article_repo: Arc<dyn ArticleRepository>,
    ) -> Self {
        Self {
            category_repo,
            article_repo,
        }
    }

    /// All categories with their published-article counts
    pub async fn list(&self) -> Result<Vec<CategoryWithCount>, CategoryServiceError> {
        self.category_repo
            .list_with_counts()
            .await
            .context("Failed to list categories")
            .map_err(Into::into)
    }

    /// The category itself plus its published articles, paginated.
    pub async fn articles(
        &self,
        category_id: i64,
        params: ListParams,
    ) -> Result<(Category, PagedResult<Article>), CategoryServiceError> {
        let category = self
            .category_repo
            .get_by_id(category_id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound)?;

        let total = self
            .article_repo
            .count_by_category(category_id)
            .await
            .context("Failed to count category articles")?;
        let params = params.clamped_to(total);
        let articles = self
            .article_repo
            .list_by_category(category_id, params.offset(), params.limit())
            .await
            .context("Failed to list category articles")?;

        Ok((category, PagedResult::new(articles, total, &params)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxArticleRepository, SqlxCategoryRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::Article;

    async fn setup() -> (
        CategoryService,
        Arc<dyn CategoryRepository>,
        Arc<dyn ArticleRepository>,
    ) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let article_repo = SqlxArticleRepository::boxed(pool);
        (
            CategoryService::new(category_repo.clone(), article_repo.clone()),
            category_repo,
            article_repo,
        )
    }

    #[tokio::test]
    async fn test_unknown_category_not_found() {
        let (service, _, _) = setup().await;
        let result = service.articles(3, ListParams::default()).await;
        assert!(matches!(result, Err(CategoryServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_articles_for_category() {
        let (service, category_repo, article_repo) = setup().await;
        let article = article_repo
            .create(&Article::new("Filed".to_string(), "Body".to_string()))
            .await
            .unwrap();
        let category = category_repo.create("Essays").await.unwrap();
        category_repo
            .set_article_categories(article.id, &[category.id])
            .await
            .unwrap();

        let (found, page) = service
            .articles(category.id, ListParams::default())
            .await
            .unwrap();
        assert_eq!(found.name, "Essays");
        assert_eq!(page.total, 1);
    }
}
