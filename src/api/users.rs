//! User management API endpoints
//!
//! - GET /api/v1/users - List users (staff only)
//! - GET /api/v1/users/{id} - Get a user (self or staff)
//! - PUT /api/v1/users/{id} - Update a user (self or staff)
//! - DELETE /api/v1/users/{id} - Delete a user (staff only)

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::api::common::{PagedResponse, PaginationQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::auth::UserResponse;
use crate::models::UpdateUserInput;

/// Request body for updating a user
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

/// Routes available to any authenticated user
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/{id}", get(get_user).put(update_user))
}

/// Routes restricted to staff
pub fn staff_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", delete(delete_user))
}

/// GET /api/v1/users - List users, paginated
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PagedResponse<UserResponse>>, ApiError> {
    let page = state.user_service.list(query.lenient()).await?;
    Ok(Json(PagedResponse::from_result(page.map(UserResponse::from))))
}

/// GET /api/v1/users/{id} - Fetch a single account
async fn get_user(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(caller)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    if !caller.can_access(id) {
        return Err(ApiError::forbidden("You may only view your own account"));
    }

    let user = state
        .user_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user.into()))
}

/// PUT /api/v1/users/{id} - Update an account
async fn update_user(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(caller)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if !caller.can_access(id) {
        return Err(ApiError::forbidden("You may only edit your own account"));
    }

    // Only staff may toggle the active flag
    if body.is_active.is_some() && !caller.is_staff {
        return Err(ApiError::forbidden("Staff privileges required"));
    }

    let input = UpdateUserInput {
        email: body.email,
        password: body.password,
        first_name: body.first_name,
        last_name: body.last_name,
        is_active: body.is_active,
    };

    let user = state.user_service.update(id, input).await?;
    Ok(Json(user.into()))
}

/// DELETE /api/v1/users/{id} - Delete an account
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.user_service.delete(id).await?;
    Ok(Json(serde_json::json!({"message": "User deleted"})))
}
