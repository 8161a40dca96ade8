//! Article API endpoints
//!
//! - GET /api/v1/articles - List published articles
//! - POST /api/v1/articles - Create an article
//! - GET /api/v1/articles/{id} - Article detail by ID
//! - PUT /api/v1/articles/{id} - Update an article
//! - GET /api/v1/articles/slug/{slug} - Article detail by slug
//! - PUT /api/v1/articles/{id}/tags - Replace an article's tags
//! - GET /api/v1/articles/search - Keyword search
//! - GET /api/v1/articles/filter-sort - Filtered and sorted listing
//! - GET /api/v1/articles/trending - Most viewed articles
//! - GET /api/v1/articles/statistics - Aggregate statistics
//! - GET /api/v1/articles/author/{profile_id} - Articles by author
//! - GET /api/v1/articles/themes - Theme listing
//! - POST /api/v1/articles/{id}/like - Like an article
//! - POST /api/v1/articles/{id}/unlike - Remove a like

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::api::common::{PagedResponse, PaginationQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::db::repositories::{ArticleFilter, ArticleSort, ArticleStatistics, SortOrder};
use crate::models::{Article, ArticleTheme, CreateArticleInput, Tag, UpdateArticleInput};
use crate::services::ArticleDetail;

/// Query parameters for GET /articles/search
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub keywords: Option<String>,
    pub theme: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationQuery,
}

/// Query parameters for GET /articles/filter-sort
#[derive(Debug, Default, Deserialize)]
pub struct FilterSortQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationQuery,
}

/// Query parameters for GET /articles/trending
#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<String>,
}

/// Request body for PUT /articles/{id}/tags
#[derive(Debug, Deserialize)]
pub struct ReplaceTagsRequest {
    pub tags: Vec<String>,
}

/// Public article routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_articles))
        .route("/search", get(search_articles))
        .route("/filter-sort", get(filter_sort_articles))
        .route("/trending", get(trending_articles))
        .route("/statistics", get(article_statistics))
        .route("/themes", get(list_themes))
        .route("/author/{profile_id}", get(articles_by_author))
        .route("/slug/{slug}", get(get_article_by_slug))
        .route("/{id}", get(get_article))
}

/// Protected article routes (require authentication)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_article))
        .route("/{id}", put(update_article))
        .route("/{id}/tags", put(replace_tags))
        .route("/{id}/like", post(like_article))
        .route("/{id}/unlike", post(unlike_article))
}

/// GET /api/v1/articles - Published articles, newest first
async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PagedResponse<Article>>, ApiError> {
    let page = state.article_service.list(query.lenient()).await?;
    Ok(Json(PagedResponse::from_result(page)))
}

/// GET /api/v1/articles/{id} - Article detail; records a view
async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ArticleDetail>, ApiError> {
    let detail = state.article_service.detail_by_id(id).await?;
    Ok(Json(detail))
}

/// GET /api/v1/articles/slug/{slug} - Article detail by slug
async fn get_article_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ArticleDetail>, ApiError> {
    let detail = state.article_service.detail_by_slug(&slug).await?;
    Ok(Json(detail))
}

/// POST /api/v1/articles - Create an article
async fn create_article(
    State(state): State<AppState>,
    Json(body): Json<CreateArticleInput>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state.article_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// PUT /api/v1/articles/{id} - Update an article
async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateArticleInput>,
) -> Result<Json<Article>, ApiError> {
    let article = state.article_service.update(id, body).await?;
    Ok(Json(article))
}

/// PUT /api/v1/articles/{id}/tags - Replace the article's tag set
async fn replace_tags(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ReplaceTagsRequest>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = state.article_service.replace_tags(id, &body.tags).await?;
    Ok(Json(tags))
}

/// GET /api/v1/articles/search - Keyword search over titles
async fn search_articles(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PagedResponse<Article>>, ApiError> {
    let params = query.pagination.strict()?;
    let filter = ArticleFilter {
        keyword: query.keywords,
        theme: query.theme,
        category: query.category,
        tag: None,
        author: query.author,
        match_description: false,
    };

    let page = state
        .article_service
        .search(filter, ArticleSort::default(), SortOrder::default(), params)
        .await?;
    Ok(Json(PagedResponse::from_result(page)))
}

/// GET /api/v1/articles/filter-sort - Filtered listing with a sort column
async fn filter_sort_articles(
    State(state): State<AppState>,
    Query(query): Query<FilterSortQuery>,
) -> Result<Json<PagedResponse<Article>>, ApiError> {
    let params = query.pagination.strict()?;

    let sort = match query.sort_by.as_deref() {
        None => ArticleSort::default(),
        Some(raw) => ArticleSort::from_str(raw).ok_or_else(|| {
            ApiError::validation_error(format!("Unknown sort field: {}", raw))
        })?,
    };
    let order = match query.order.as_deref() {
        None => SortOrder::default(),
        Some(raw) => SortOrder::from_str(raw)
            .ok_or_else(|| ApiError::validation_error(format!("Unknown sort order: {}", raw)))?,
    };

    let filter = ArticleFilter {
        keyword: query.keyword,
        theme: None,
        category: query.category,
        tag: query.tag,
        author: None,
        match_description: true,
    };

    let page = state.article_service.search(filter, sort, order, params).await?;
    Ok(Json(PagedResponse::from_result(page)))
}

/// GET /api/v1/articles/trending - Most viewed published articles
async fn trending_articles(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let limit = match query.limit.as_deref() {
        None => 10,
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| ApiError::validation_error("limit must be a positive integer"))?,
    };

    let articles = state.article_service.trending(limit).await?;
    Ok(Json(articles))
}

/// GET /api/v1/articles/statistics - Aggregate article statistics
async fn article_statistics(
    State(state): State<AppState>,
) -> Result<Json<ArticleStatistics>, ApiError> {
    let stats = state.article_service.statistics().await?;
    Ok(Json(stats))
}

/// GET /api/v1/articles/author/{profile_id} - Published articles by author
async fn articles_by_author(
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PagedResponse<Article>>, ApiError> {
    let page = state
        .article_service
        .list_by_author(profile_id, query.lenient())
        .await?;
    Ok(Json(PagedResponse::from_result(page)))
}

/// GET /api/v1/articles/themes - Theme listing
async fn list_themes(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PagedResponse<ArticleTheme>>, ApiError> {
    let page = state.article_service.themes(query.lenient()).await?;
    Ok(Json(PagedResponse::from_result(page)))
}

/// POST /api/v1/articles/{id}/like
async fn like_article(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.interaction_service.like_article(&user, id).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"message": "Article liked"})),
    ))
}

/// POST /api/v1/articles/{id}/unlike
async fn unlike_article(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.interaction_service.unlike_article(&user, id).await?;
    Ok(Json(serde_json::json!({"message": "Like removed"})))
}
