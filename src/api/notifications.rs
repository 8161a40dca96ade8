//! Notification API endpoints
//!
//! - GET /api/v1/notifications - Current user's inbox, newest first
//! - POST /api/v1/notifications/{id}/read - Mark a notification read

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::Notification;

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/{id}/read", post(mark_read))
}

/// GET /api/v1/notifications
async fn list_notifications(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = state.notification_service.list_for_user(user.id).await?;
    Ok(Json(notifications))
}

/// POST /api/v1/notifications/{id}/read
async fn mark_read(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.notification_service.mark_read(id, user.id).await?;
    Ok(Json(serde_json::json!({"message": "Notification marked read"})))
}
