//! Category API endpoints
//!
//! - GET /api/v1/categories - All categories with post counts
//! - GET /api/v1/categories/{id}/articles - Published articles in a category

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::common::{PagedResponse, PaginationQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{Article, Category, CategoryWithCount};

/// Response for a category's article listing
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryArticlesResponse {
    pub category: Category,
    #[serde(flatten)]
    pub articles: PagedResponse<Article>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{id}/articles", get(category_articles))
}

/// GET /api/v1/categories
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryWithCount>>, ApiError> {
    let categories = state.category_service.list().await?;
    Ok(Json(categories))
}

/// GET /api/v1/categories/{id}/articles
async fn category_articles(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<CategoryArticlesResponse>, ApiError> {
    let (category, page) = state.category_service.articles(id, query.lenient()).await?;
    Ok(Json(CategoryArticlesResponse {
        category,
        articles: PagedResponse::from_result(page),
    }))
}
