//! Author service
//!
//! Business logic for the standalone author directory.

use crate::db::repositories::AuthorRepository;
use crate::models::{Author, ListParams, PagedResult};
use anyhow::Context;
use std::sync::Arc;

/// Error types for author service operations
#[derive(Debug, thiserror::Error)]
pub enum AuthorServiceError {
    /// Author not found
    #[error("Author not found")]
    NotFound,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Author service
pub struct AuthorService {
    repo: Arc<dyn AuthorRepository>,
}

impl AuthorService {
    pub fn new(repo: Arc<dyn AuthorRepository>) -> Self {
        Self { repo }
    }

    /// Create a new author entry
    pub async fn create(&self, author: Author) -> Result<Author, AuthorServiceError> {
        if author.name.trim().is_empty() {
            return Err(AuthorServiceError::ValidationError(
                "Author name cannot be empty".to_string(),
            ));
        }
        self.repo
            .create(&author)
            .await
            .context("Failed to create author")
            .map_err(Into::into)
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Author, AuthorServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get author")?
            .ok_or(AuthorServiceError::NotFound)
    }

    /// List authors, paginated
    pub async fn list(&self, params: ListParams) -> Result<PagedResult<Author>, AuthorServiceError> {
        let total = self
            .repo
            .count()
            .await
            .context("Failed to count authors")?;
        let params = params.clamped_to(total);
        let authors = self
            .repo
            .list(params.offset(), params.limit())
            .await
            .context("Failed to list authors")?;

        Ok(PagedResult::new(authors, total, &params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxAuthorRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> AuthorService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        AuthorService::new(SqlxAuthorRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = setup().await;
        let created = service.create(Author::new("N. K. Okafor".to_string())).await.unwrap();
        let fetched = service.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.name, "N. K. Okafor");
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let service = setup().await;
        let result = service.create(Author::new("  ".to_string())).await;
        assert!(matches!(result, Err(AuthorServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_missing_author_not_found() {
        let service = setup().await;
        assert!(matches!(
            service.get_by_id(42).await,
            Err(AuthorServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_paginated() {
        let service = setup().await;
        for name in ["A", "B", "C"] {
            service.create(Author::new(name.to_string())).await.unwrap();
        }
        let page = service.list(ListParams::new(1, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
    }
}
