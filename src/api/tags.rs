//! Tag API endpoints
//!
//! - GET /api/v1/tags - All tags with published-article counts
//! - GET /api/v1/tags/{id}/articles - Published articles carrying a tag

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::common::{PagedResponse, PaginationQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{Article, Tag, TagWithCount};

/// Response for a tag's article listing
#[derive(Debug, Serialize, Deserialize)]
pub struct TagArticlesResponse {
    pub tag: Tag,
    #[serde(flatten)]
    pub articles: PagedResponse<Article>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags))
        .route("/{id}/articles", get(tag_articles))
}

/// GET /api/v1/tags
async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<TagWithCount>>, ApiError> {
    let tags = state.tag_service.list().await?;
    Ok(Json(tags))
}

/// GET /api/v1/tags/{id}/articles
async fn tag_articles(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<TagArticlesResponse>, ApiError> {
    let (tag, page) = state.tag_service.articles(id, query.lenient()).await?;
    Ok(Json(TagArticlesResponse {
        tag,
        articles: PagedResponse::from_result(page),
    }))
}
