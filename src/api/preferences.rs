//! Notification preference API endpoints
//!
//! - GET /api/v1/preferences/notifications - Current settings
//! - PUT /api/v1/preferences/notifications - Replace settings
//! - PATCH /api/v1/preferences/notifications - Merge settings

use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{NotificationSettings, UpdateNotificationSettingsInput};

/// Routes for notification preferences (require authentication)
pub fn protected_router() -> Router<AppState> {
    Router::new().route(
        "/notifications",
        get(get_settings).put(replace_settings).patch(merge_settings),
    )
}

/// GET /api/v1/preferences/notifications
async fn get_settings(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<NotificationSettings>, ApiError> {
    let settings = state.notification_service.settings_for_user(user.id).await?;
    Ok(Json(settings))
}

/// PUT /api/v1/preferences/notifications - flags omitted from the body
/// revert to enabled
async fn replace_settings(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateNotificationSettingsInput>,
) -> Result<Json<NotificationSettings>, ApiError> {
    let settings = state
        .notification_service
        .replace_settings(user.id, body)
        .await?;
    Ok(Json(settings))
}

/// PATCH /api/v1/preferences/notifications - only the provided flags change
async fn merge_settings(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateNotificationSettingsInput>,
) -> Result<Json<NotificationSettings>, ApiError> {
    let settings = state
        .notification_service
        .merge_settings(user.id, body)
        .await?;
    Ok(Json(settings))
}
