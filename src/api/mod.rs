//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the Escriba blog backend:
//! - Auth endpoints (register, login, logout, me)
//! - User management endpoints
//! - Profile and follow endpoints
//! - Article endpoints (listing, detail, search, trending, statistics, likes)
//! - Tag, category and author endpoints
//! - Notification inbox and preference endpoints

pub mod articles;
pub mod auth;
pub mod authors;
pub mod categories;
pub mod common;
pub mod middleware;
pub mod notifications;
pub mod preferences;
pub mod profile;
pub mod tags;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use common::{PagedResponse, PaginationQuery};
pub use middleware::{ApiError, AppState, AuthenticatedUser};

use crate::db::repositories::{
    SqlxArticleRepository, SqlxAuthorRepository, SqlxCategoryRepository, SqlxInteractionRepository,
    SqlxNotificationRepository, SqlxProfileRepository, SqlxSessionRepository, SqlxTagRepository,
    SqlxThemeRepository, SqlxUserRepository,
};
use crate::services::{
    ArticleService, AuthorService, CategoryService, InteractionService, NotificationService,
    ProfileService, TagService, UserService,
};

/// Wire repositories and services over a database pool
pub fn build_state(pool: sqlx::SqlitePool, session_ttl_days: i64) -> AppState {
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let profile_repo = SqlxProfileRepository::boxed(pool.clone());
    let article_repo = SqlxArticleRepository::boxed(pool.clone());
    let theme_repo = SqlxThemeRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let author_repo = SqlxAuthorRepository::boxed(pool.clone());
    let interaction_repo = SqlxInteractionRepository::boxed(pool.clone());
    let notification_repo = SqlxNotificationRepository::boxed(pool.clone());

    AppState {
        pool,
        user_service: Arc::new(
            UserService::new(
                user_repo.clone(),
                session_repo,
                profile_repo.clone(),
                notification_repo.clone(),
            )
            .with_session_ttl(session_ttl_days),
        ),
        profile_service: Arc::new(ProfileService::new(profile_repo.clone())),
        article_service: Arc::new(ArticleService::new(
            article_repo.clone(),
            theme_repo,
            tag_repo.clone(),
            category_repo.clone(),
            profile_repo.clone(),
            user_repo,
        )),
        tag_service: Arc::new(TagService::new(tag_repo, article_repo.clone())),
        category_service: Arc::new(CategoryService::new(category_repo, article_repo.clone())),
        author_service: Arc::new(AuthorService::new(author_repo)),
        interaction_service: Arc::new(InteractionService::new(
            interaction_repo,
            article_repo,
            profile_repo.clone(),
            notification_repo.clone(),
        )),
        notification_service: Arc::new(NotificationService::new(notification_repo, profile_repo)),
    }
}

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Staff routes (need the staff flag)
    let staff_routes = Router::new()
        .nest("/users", users::staff_router())
        .nest("/authors", authors::staff_router())
        .route_layer(axum_middleware::from_fn(middleware::require_staff))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not staff)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/users", users::protected_router())
        .nest("/profile", profile::protected_router())
        .nest("/profiles", profile::follow_router())
        .nest("/preferences", preferences::protected_router())
        .nest("/notifications", notifications::protected_router())
        .nest("/articles", articles::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .nest("/articles", articles::public_router())
        .nest("/tags", tags::router())
        .nest("/categories", categories::router())
        .nest("/authors", authors::public_router())
        .nest("/profiles", profile::public_router())
        .merge(staff_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);
    if let Ok(origin) = cors_origin.parse::<HeaderValue>() {
        cors = cors.allow_origin(origin);
    }

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use axum_test::TestServer;
    use serde_json::json;

    async fn test_server() -> TestServer {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let state = build_state(pool, 7);
        TestServer::new(build_router(state, "http://localhost:3000")).unwrap()
    }

    async fn register(server: &TestServer, username: &str) -> String {
        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "secret123",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<serde_json::Value>()["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_register_login_me_flow() {
        let server = test_server().await;
        let token = register(&server, "ada").await;

        let me = server
            .get("/api/v1/auth/me")
            .authorization_bearer(&token)
            .await;
        me.assert_status_ok();
        assert_eq!(me.json::<serde_json::Value>()["username"], "ada");

        // A fresh login works too
        let login = server
            .post("/api/v1/auth/login")
            .json(&json!({"username_or_email": "ada@example.com", "password": "secret123"}))
            .await;
        login.assert_status_ok();
    }

    #[tokio::test]
    async fn test_me_requires_auth() {
        let server = test_server().await;
        let response = server.get("/api/v1/auth/me").await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let server = test_server().await;
        register(&server, "ada").await;

        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": "ada",
                "email": "other@example.com",
                "password": "secret123",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_article_create_list_detail() {
        let server = test_server().await;
        let token = register(&server, "ada").await;

        let created = server
            .post("/api/v1/articles")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Hello World",
                "content": "Body text",
                "tags": ["rust"],
                "categories": ["Essays"],
            }))
            .await;
        created.assert_status(axum::http::StatusCode::CREATED);
        let id = created.json::<serde_json::Value>()["id"].as_i64().unwrap();

        let list = server.get("/api/v1/articles").await;
        list.assert_status_ok();
        let body = list.json::<serde_json::Value>();
        assert_eq!(body["count"], 1);

        let detail = server.get(&format!("/api/v1/articles/{}", id)).await;
        detail.assert_status_ok();
        let body = detail.json::<serde_json::Value>();
        assert_eq!(body["title"], "Hello World");
        assert_eq!(body["views_count"], 1);
        assert_eq!(body["tags"][0]["name"], "rust");

        let by_slug = server.get("/api/v1/articles/slug/hello-world").await;
        by_slug.assert_status_ok();
    }

    #[tokio::test]
    async fn test_article_creation_requires_auth() {
        let server = test_server().await;
        let response = server
            .post("/api/v1/articles")
            .json(&json!({"title": "Nope", "content": "x"}))
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_search_rejects_bad_pagination() {
        let server = test_server().await;
        let response = server
            .get("/api/v1/articles/search")
            .add_query_param("page", "abc")
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_tolerates_bad_pagination() {
        let server = test_server().await;
        let response = server
            .get("/api/v1/articles")
            .add_query_param("page", "abc")
            .await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_filter_sort_rejects_unknown_sort() {
        let server = test_server().await;
        let response = server
            .get("/api/v1/articles/filter-sort")
            .add_query_param("sort_by", "password_hash")
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_like_and_double_like() {
        let server = test_server().await;
        let token = register(&server, "ada").await;

        let created = server
            .post("/api/v1/articles")
            .authorization_bearer(&token)
            .json(&json!({"title": "Liked", "content": "x"}))
            .await;
        let id = created.json::<serde_json::Value>()["id"].as_i64().unwrap();

        let like = server
            .post(&format!("/api/v1/articles/{}/like", id))
            .authorization_bearer(&token)
            .await;
        like.assert_status(axum::http::StatusCode::CREATED);

        let again = server
            .post(&format!("/api/v1/articles/{}/like", id))
            .authorization_bearer(&token)
            .await;
        again.assert_status(axum::http::StatusCode::BAD_REQUEST);

        let unlike = server
            .post(&format!("/api/v1/articles/{}/unlike", id))
            .authorization_bearer(&token)
            .await;
        unlike.assert_status_ok();
    }

    #[tokio::test]
    async fn test_follow_flow_and_notification() {
        let server = test_server().await;
        let follower = register(&server, "ada").await;
        let followed = register(&server, "grace").await;

        let follow = server
            .post("/api/v1/profiles/grace/follow")
            .authorization_bearer(&follower)
            .await;
        follow.assert_status(axum::http::StatusCode::CREATED);

        let inbox = server
            .get("/api/v1/notifications")
            .authorization_bearer(&followed)
            .await;
        inbox.assert_status_ok();
        let body = inbox.json::<serde_json::Value>();
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert!(body[0]["message"]
            .as_str()
            .unwrap()
            .contains("started following you"));
    }

    #[tokio::test]
    async fn test_self_follow_rejected() {
        let server = test_server().await;
        let token = register(&server, "ada").await;
        let response = server
            .post("/api/v1/profiles/ada/follow")
            .authorization_bearer(&token)
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preferences_put_resets_unset_flags() {
        let server = test_server().await;
        let token = register(&server, "ada").await;

        let patched = server
            .patch("/api/v1/preferences/notifications")
            .authorization_bearer(&token)
            .json(&json!({"notify_on_like": false}))
            .await;
        patched.assert_status_ok();
        assert_eq!(patched.json::<serde_json::Value>()["notify_on_like"], false);

        let put = server
            .put("/api/v1/preferences/notifications")
            .authorization_bearer(&token)
            .json(&json!({"notify_on_comment": false}))
            .await;
        put.assert_status_ok();
        let body = put.json::<serde_json::Value>();
        assert_eq!(body["notify_on_like"], true);
        assert_eq!(body["notify_on_comment"], false);
    }

    #[tokio::test]
    async fn test_user_list_is_staff_only() {
        let server = test_server().await;
        let token = register(&server, "ada").await;

        let response = server
            .get("/api/v1/users")
            .authorization_bearer(&token)
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_user_cannot_view_other_account() {
        let server = test_server().await;
        let ada = register(&server, "ada").await;
        let me = server
            .get("/api/v1/auth/me")
            .authorization_bearer(&ada)
            .await;
        let ada_id = me.json::<serde_json::Value>()["id"].as_i64().unwrap();
        let grace = register(&server, "grace").await;

        let response = server
            .get(&format!("/api/v1/users/{}", ada_id))
            .authorization_bearer(&grace)
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_tags_and_categories_listing() {
        let server = test_server().await;
        let token = register(&server, "ada").await;
        server
            .post("/api/v1/articles")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "Tagged",
                "content": "x",
                "tags": ["rust", "web"],
                "categories": ["Essays"],
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let tags = server.get("/api/v1/tags").await;
        tags.assert_status_ok();
        assert_eq!(tags.json::<serde_json::Value>().as_array().unwrap().len(), 2);

        let categories = server.get("/api/v1/categories").await;
        categories.assert_status_ok();
        let body = categories.json::<serde_json::Value>();
        assert_eq!(body[0]["name"], "Essays");
        assert_eq!(body[0]["post_count"], 1);
    }

    #[tokio::test]
    async fn test_session_cookie_authenticates() {
        let server = test_server().await;
        let token = register(&server, "ada").await;

        let response = server
            .get("/api/v1/auth/me")
            .add_header(
                axum::http::header::COOKIE,
                format!("session={}", token).parse::<HeaderValue>().unwrap(),
            )
            .await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let server = test_server().await;
        let token = register(&server, "ada").await;

        server
            .post("/api/v1/auth/logout")
            .authorization_bearer(&token)
            .await
            .assert_status_ok();

        let me = server
            .get("/api/v1/auth/me")
            .authorization_bearer(&token)
            .await;
        me.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_cookie_max_age_tracks_ttl() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let state = build_state(pool, 1);
        let server = TestServer::new(build_router(state, "http://localhost:3000")).unwrap();

        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "username": "ada",
                "email": "ada@example.com",
                "password": "secret123",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let max_age: i64 = cookie
            .split("Max-Age=")
            .nth(1)
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .trim()
            .parse()
            .unwrap();

        let one_day = 24 * 60 * 60;
        assert!(max_age <= one_day);
        assert!(max_age > one_day - 60);
    }

    #[tokio::test]
    async fn test_tag_articles_page_past_end_is_empty() {
        let server = test_server().await;
        let token = register(&server, "ada").await;
        server
            .post("/api/v1/articles")
            .authorization_bearer(&token)
            .json(&json!({"title": "Tagged", "content": "x", "tags": ["rust"]}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let tags = server.get("/api/v1/tags").await.json::<serde_json::Value>();
        let tag_id = tags[0]["id"].as_i64().unwrap();

        let response = server
            .get(&format!("/api/v1/tags/{}/articles", tag_id))
            .add_query_param("page", "5")
            .await;
        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["count"], 1);
        assert_eq!(body["results"].as_array().unwrap().len(), 0);
        assert!(body["next"].is_null());
        assert!(body["previous"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_article_404() {
        let server = test_server().await;
        let response = server.get("/api/v1/articles/999").await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
