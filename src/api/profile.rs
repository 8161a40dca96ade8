//! Profile API endpoints
//!
//! - GET /api/v1/profile - Current user's profile
//! - PUT /api/v1/profile - Update the current user's profile
//! - GET /api/v1/profiles/{username} - Public profile lookup
//! - POST /api/v1/profiles/{username}/follow - Follow a profile
//! - POST /api/v1/profiles/{username}/unfollow - Unfollow a profile

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Gender, UpdateProfileInput, UserProfile};

/// Response for profile info
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub user_id: i64,
    pub bio: String,
    pub location: String,
    pub birth_date: Option<NaiveDate>,
    pub avatar: String,
    pub gender: Gender,
    pub is_author: bool,
    pub follow_count: i64,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        let avatar = profile.avatar_or_default().to_string();
        Self {
            id: profile.id,
            user_id: profile.user_id,
            bio: profile.bio,
            location: profile.location,
            birth_date: profile.birth_date,
            avatar,
            gender: profile.gender,
            is_author: profile.is_author,
            follow_count: profile.follow_count,
        }
    }
}

/// Request body for updating the profile
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub location: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub avatar: Option<String>,
    pub gender: Option<Gender>,
}

/// Routes for the caller's own profile
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(update_profile))
}

/// Public profile lookup routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/{username}", get(get_profile_by_username))
}

/// Follow routes (require authentication)
pub fn follow_router() -> Router<AppState> {
    Router::new()
        .route("/{username}/follow", post(follow))
        .route("/{username}/unfollow", post(unfollow))
}

/// GET /api/v1/profile - Current user's profile
async fn get_profile(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.profile_service.get_for_user(user.id).await?;
    Ok(Json(profile.into()))
}

/// PUT /api/v1/profile - Update the current user's profile
async fn update_profile(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let input = UpdateProfileInput {
        bio: body.bio,
        location: body.location,
        birth_date: body.birth_date,
        avatar: body.avatar,
        gender: body.gender,
    };

    let profile = state.profile_service.update(user.id, input).await?;
    Ok(Json(profile.into()))
}

/// GET /api/v1/profiles/{username} - Public profile lookup
async fn get_profile_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state
        .profile_service
        .get_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(Json(profile.into()))
}

/// POST /api/v1/profiles/{username}/follow
async fn follow(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.interaction_service.follow_profile(&user, &username).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": format!("You are now following {}", username)
        })),
    ))
}

/// POST /api/v1/profiles/{username}/unfollow
async fn unfollow(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .interaction_service
        .unfollow_profile(&user, &username)
        .await?;
    Ok(Json(serde_json::json!({
        "message": format!("You are no longer following {}", username)
    })))
}
