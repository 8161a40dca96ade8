//! Author API endpoints
//!
//! - GET /api/v1/authors - Author directory
//! - GET /api/v1/authors/{id} - Single author
//! - POST /api/v1/authors - Create an author (staff only)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::{PagedResponse, PaginationQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::models::Author;

/// Request body for creating an author
#[derive(Debug, Deserialize)]
pub struct CreateAuthorRequest {
    pub name: String,
    pub biography: Option<String>,
    pub profession: Option<String>,
    pub image: Option<String>,
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_authors))
        .route("/{id}", get(get_author))
}

pub fn staff_router() -> Router<AppState> {
    Router::new().route("/", post(create_author))
}

/// GET /api/v1/authors
async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PagedResponse<Author>>, ApiError> {
    let page = state.author_service.list(query.lenient()).await?;
    Ok(Json(PagedResponse::from_result(page)))
}

/// GET /api/v1/authors/{id}
async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Author>, ApiError> {
    let author = state.author_service.get_by_id(id).await?;
    Ok(Json(author))
}

/// POST /api/v1/authors
async fn create_author(
    State(state): State<AppState>,
    Json(body): Json<CreateAuthorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let author = Author {
        id: 0,
        name: body.name,
        biography: body.biography,
        profession: body.profession,
        image: body.image,
    };

    let created = state.author_service.create(author).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
