//! Tag service
//!
//! Business logic for tag listings and the articles carrying a tag.

use crate::db::repositories::{ArticleRepository, TagRepository};
use crate::models::{Article, ListParams, PagedResult, Tag, TagWithCount};
use anyhow::Context;
use std::sync::Arc;

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    /// Tag not found
    #[error("Tag not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Tag service
pub struct TagService {
    tag_repo: Arc<dyn TagRepository>,
    article_repo: Arc<dyn ArticleRepository>,
}

impl TagService {
    pub fn new(tag_repo: Arc<dyn TagRepository>, article_repo: Arc<dyn ArticleRepository>) -> Self {
        Self {
            tag_repo,
            article_repo,
        }
    }

    /// All tags with their published-article counts
    pub async fn list(&self) -> Result<Vec<TagWithCount>, TagServiceError> {
        self.tag_repo
            .list_with_counts()
            .await
            .context("Failed to list tags")
            .map_err(Into::into)
    }

    /// The tag itself plus its published articles, paginated newest first.
    pub async fn articles(
        &self,
        tag_id: i64,
        params: ListParams,
    ) -> Result<(Tag, PagedResult<Article>), TagServiceError> {
        let tag = self
            .tag_repo
            .get_by_id(tag_id)
            .await
            .context("Failed to get tag")?
            .ok_or(TagServiceError::NotFound)?;

        let total = self
            .article_repo
            .count_by_tag(tag_id)
            .await
            .context("Failed to count tag articles")?;

        // Pages past the end yield an empty result set, not the last page
        if params.page > 1 && params.offset() >= total {
            return Ok((tag, PagedResult::new(Vec::new(), total, &params)));
        }

        let articles = self
            .article_repo
            .list_by_tag(tag_id, params.offset(), params.limit())
            .await
            .context("Failed to list tag articles")?;

        Ok((tag, PagedResult::new(articles, total, &params)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxArticleRepository, SqlxTagRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::Article;

    async fn setup() -> (TagService, Arc<dyn TagRepository>, Arc<dyn ArticleRepository>) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let tag_repo = SqlxTagRepository::boxed(pool.clone());
        let article_repo = SqlxArticleRepository::boxed(pool);
        (
            TagService::new(tag_repo.clone(), article_repo.clone()),
            tag_repo,
            article_repo,
        )
    }

    #[tokio::test]
    async fn test_unknown_tag_not_found() {
        let (service, _, _) = setup().await;
        let result = service.articles(7, ListParams::default()).await;
        assert!(matches!(result, Err(TagServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_articles_for_tag() {
        let (service, tag_repo, article_repo) = setup().await;
        let article = article_repo
            .create(&Article::new("Tagged".to_string(), "Body".to_string()))
            .await
            .unwrap();
        let tag = tag_repo.create("news").await.unwrap();
        tag_repo.set_article_tags(article.id, &[tag.id]).await.unwrap();

        let (found_tag, page) = service.articles(tag.id, ListParams::default()).await.unwrap();
        assert_eq!(found_tag.name, "news");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Tagged");
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let (service, tag_repo, article_repo) = setup().await;
        let article = article_repo
            .create(&Article::new("Tagged".to_string(), "Body".to_string()))
            .await
            .unwrap();
        let tag = tag_repo.create("news").await.unwrap();
        tag_repo.set_article_tags(article.id, &[tag.id]).await.unwrap();

        let (_, page) = service
            .articles(tag.id, ListParams::new(5, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.next_page(), None);
        assert_eq!(page.previous_page(), None);
    }

    #[tokio::test]
    async fn test_list_counts() {
        let (service, tag_repo, _) = setup().await;
        tag_repo.create("solo").await.unwrap();
        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].article_count, 0);
    }
}
