//! API layer - HTTP handlers and routing
//!
//! Route groups:
//! - public:    register / login / isRegistered
//! - protected: everything else, behind the bearer-token middleware
//! - staff:     subset mutations and the diary, additionally behind the
//!              staff check
//!
//! Static files under the data directory are served next to the API,
//! mirroring how the platform hosts uploaded assets.

pub mod articles;
pub mod comments;
pub mod common;
pub mod diary;
pub mod files;
pub mod messages;
pub mod middleware;
pub mod responses;
pub mod subsets;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::path::Path;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthUser};
pub use responses::{ApiResponse, PageData};

/// Build the API router mounted under /api
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Public user routes (no token required)
    let public_routes = Router::new()
        .route("/user/isRegistered", get(users::is_registered))
        .route("/user/register", post(users::register))
        .route("/user/login", post(users::login));

    // Staff routes (subset mutations and the diary)
    let staff_routes = Router::new()
        .route("/subset", post(subsets::create_subset))
        .route("/subset/{id}", put(subsets::update_subset))
        .route("/subset/{id}", delete(subsets::delete_subset))
        .route("/diary", post(diary::create_diary))
        .route("/diary", get(diary::list_diary))
        .route("/diary/{id}", get(diary::get_diary))
        .route("/diary/{id}", put(diary::update_diary))
        .route("/diary/{id}", delete(diary::delete_diary))
        .route_layer(axum_middleware::from_fn(middleware::require_staff))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Authenticated routes
    let protected_routes = Router::new()
        .route("/user/me", get(users::me))
        .route("/article", post(articles::create_article))
        .route("/article", get(articles::list_articles))
        .route("/article/{id}", get(articles::get_article))
        .route("/article/{id}", put(articles::update_article))
        .route("/article/{id}", delete(articles::delete_article))
        .route("/article/{id}/status", patch(articles::update_article_status))
        .route("/article/{id}/praise", post(articles::praise_article))
        .route("/comment/all", get(comments::list_comments))
        .route("/comment/my", get(comments::list_my_comments))
        .route("/comment", post(comments::create_comment))
        .route("/comment/{id}", delete(comments::delete_comment))
        .route("/message", post(messages::send_message))
        .route("/message/inbox", get(messages::inbox))
        .route("/message/outbox", get(messages::outbox))
        .route("/message/read", patch(messages::mark_read))
        .route("/message/unread/count", get(messages::unread_count))
        .route("/message/{id}", delete(messages::delete_message))
        .route("/subset", get(subsets::list_subsets))
        .route("/file", get(files::list_files))
        .route("/file", post(files::create_file))
        .route("/file/{id}", delete(files::delete_file))
        .route("/weather", get(diary::list_weather))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(staff_routes)
        .merge(protected_routes)
}

/// Build the complete router with CORS, tracing and static file serving
pub fn build_router(state: AppState, cors_origin: &str, data_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173")),
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        // Uploaded assets live under the data directory
        .fallback_service(ServeDir::new(data_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::db::repositories::{
        SqlxArticleRepository, SqlxCommentRepository, SqlxDiaryRepository, SqlxFileRepository,
        SqlxMessageRepository, SqlxSubsetRepository, SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::services::{
        ArticleService, CommentService, DiaryService, FileService, MessageService, SubsetService,
        TokenService, UserService,
    };
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::shared(pool.clone());
        let article_repo = SqlxArticleRepository::shared(pool.clone());

        let state = AppState {
            user_service: Arc::new(UserService::new(user_repo.clone())),
            article_service: Arc::new(ArticleService::new(article_repo.clone())),
            comment_service: Arc::new(CommentService::new(
                SqlxCommentRepository::shared(pool.clone()),
                article_repo,
            )),
            message_service: Arc::new(MessageService::new(
                SqlxMessageRepository::shared(pool.clone()),
                user_repo,
            )),
            subset_service: Arc::new(SubsetService::new(SqlxSubsetRepository::shared(
                pool.clone(),
            ))),
            file_service: Arc::new(FileService::new(SqlxFileRepository::shared(pool.clone()))),
            diary_service: Arc::new(DiaryService::new(SqlxDiaryRepository::shared(pool))),
            token_service: Arc::new(TokenService::new(&AuthConfig {
                jwt_secret: "contract-test-secret".to_string(),
                token_expiry_hours: 24,
            })),
        };

        build_router(state, "http://localhost:5173", Path::new("data"))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Register the bootstrap admin and a normal user; returns their tokens.
    async fn register_and_login(app: &Router) -> (String, String) {
        let (status, _) = send(
            app,
            "POST",
            "/api/user/register",
            None,
            Some(json!({"name": "lin", "mail": "lin@linlog.com", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(
            app,
            "POST",
            "/api/user/register",
            None,
            Some(json!({"name": "guest", "mail": "guest@linlog.com", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            app,
            "POST",
            "/api/user/login",
            None,
            Some(json!({"name": "lin", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let admin_token = body["data"]["token"].as_str().unwrap().to_string();

        let (_, body) = send(
            app,
            "POST",
            "/api/user/login",
            None,
            Some(json!({"name": "guest", "password": "secret123"})),
        )
        .await;
        let guest_token = body["data"]["token"].as_str().unwrap().to_string();

        (admin_token, guest_token)
    }

    #[tokio::test]
    async fn test_register_login_envelope() {
        let app = test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/user/register",
            None,
            Some(json!({"name": "lin", "mail": "lin@linlog.com", "password": "secret123"})),
        )
        .await;
        // HTTP 201, envelope code 200
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["code"], 200);
        assert_eq!(body["data"]["name"], "lin");

        let (status, body) = send(
            &app,
            "POST",
            "/api/user/login",
            None,
            Some(json!({"name": "lin", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);

        let (status, body) = send(
            &app,
            "POST",
            "/api/user/login",
            None,
            Some(json!({"name": "lin", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 200);
        assert!(body["data"]["token"].as_str().is_some());
        // Password never appears on the wire
        assert!(body["data"]["user"].get("password").is_none());
        assert!(body["data"]["user"].get("passwordHash").is_none());
        assert_eq!(body["data"]["user"]["userType"], "admin");
    }

    #[tokio::test]
    async fn test_is_registered() {
        let app = test_app().await;

        let (status, body) = send(&app, "GET", "/api/user/isRegistered", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);

        let (status, body) = send(
            &app,
            "GET",
            "/api/user/isRegistered?mail=lin@linlog.com",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["isRegistered"], false);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = test_app().await;

        let (status, body) = send(&app, "GET", "/api/article", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);

        let (status, body) =
            send(&app, "GET", "/api/article", Some("tampered-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);
    }

    #[tokio::test]
    async fn test_article_crud_flow() {
        let app = test_app().await;
        let (admin, _) = register_and_login(&app).await;

        // Missing fields rejected
        let (status, body) = send(
            &app,
            "POST",
            "/api/article",
            Some(&admin),
            Some(json!({"title": "缺内容"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);

        // Create
        let (status, body) = send(
            &app,
            "POST",
            "/api/article",
            Some(&admin),
            Some(json!({"title": "第一篇", "content": "正文", "classify": "article"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["code"], 200);
        let article_id = body["data"]["articleId"].as_i64().unwrap();

        // List shows the draft
        let (status, body) = send(&app, "GET", "/api/article", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["list"][0]["state"], "draft");

        // Publish
        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/article/{}/status", article_id),
            Some(&admin),
            Some(json!({"state": "published"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 200);

        // Detail carries content and publishedAt
        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/article/{}", article_id),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["content"], "正文");
        assert!(body["data"]["publishedAt"].as_str().is_some());

        // Delete, then the detail is gone
        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/article/{}", article_id),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/article/{}", article_id),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);

        // Deleting again is a 403 per the ownership rule
        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/api/article/{}", article_id),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], 403);
    }

    #[tokio::test]
    async fn test_invalid_pagination_rejected() {
        let app = test_app().await;
        let (admin, _) = register_and_login(&app).await;

        let (status, body) =
            send(&app, "GET", "/api/article?page=0", Some(&admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);

        let (status, _) =
            send(&app, "GET", "/api/article?pageSize=99", Some(&admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_normal_user_sees_only_own_articles() {
        let app = test_app().await;
        let (admin, guest) = register_and_login(&app).await;

        send(
            &app,
            "POST",
            "/api/article",
            Some(&admin),
            Some(json!({"title": "管理员的", "content": "x", "classify": "article"})),
        )
        .await;
        send(
            &app,
            "POST",
            "/api/article",
            Some(&guest),
            Some(json!({"title": "访客的", "content": "y", "classify": "article"})),
        )
        .await;

        let (_, body) = send(&app, "GET", "/api/article", Some(&admin), None).await;
        assert_eq!(body["data"]["total"], 2);

        let (_, body) = send(&app, "GET", "/api/article", Some(&guest), None).await;
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["list"][0]["title"], "访客的");
    }

    #[tokio::test]
    async fn test_message_flow() {
        let app = test_app().await;
        let (admin, guest) = register_and_login(&app).await;

        // Guest (normal) may not send a system message
        let (status, body) = send(
            &app,
            "POST",
            "/api/message",
            Some(&guest),
            Some(json!({"receiverId": 1, "type": "system", "content": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], 403);

        // Admin sends a notice to the guest (user id 2)
        let (status, body) = send(
            &app,
            "POST",
            "/api/message",
            Some(&admin),
            Some(json!({"receiverId": 2, "type": "notice", "content": "欢迎"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let message_id = body["data"]["messageId"].as_i64().unwrap();

        // Guest sees it unread in the inbox
        let (_, body) = send(&app, "GET", "/api/message/inbox", Some(&guest), None).await;
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["list"][0]["isRead"], false);

        let (_, body) = send(
            &app,
            "GET",
            "/api/message/unread/count",
            Some(&guest),
            None,
        )
        .await;
        assert_eq!(body["data"]["unreadCount"], 1);

        // Mark read (single id form)
        let (status, body) = send(
            &app,
            "PATCH",
            "/api/message/read",
            Some(&guest),
            Some(json!({"messageIds": message_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["markedCount"], 1);

        let (_, body) = send(
            &app,
            "GET",
            "/api/message/unread/count",
            Some(&guest),
            None,
        )
        .await;
        assert_eq!(body["data"]["unreadCount"], 0);
    }

    #[tokio::test]
    async fn test_staff_gate_on_diary_and_subset() {
        let app = test_app().await;
        let (admin, guest) = register_and_login(&app).await;

        // Normal user blocked
        let (status, body) = send(
            &app,
            "POST",
            "/api/diary",
            Some(&guest),
            Some(json!({"title": "偷看", "content": "..."})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], 403);

        let (status, _) = send(
            &app,
            "POST",
            "/api/subset",
            Some(&guest),
            Some(json!({"subsetName": "技术", "classify": "article"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Admin passes
        let (status, body) = send(
            &app,
            "POST",
            "/api/diary",
            Some(&admin),
            Some(json!({"title": "今天", "content": "写代码", "mood": "happy", "createdAt": "2025-11-04"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["code"], 200);

        let (status, body) = send(&app, "GET", "/api/diary", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["list"][0]["mood"], "happy");

        // Any authenticated user can read the weather dictionary
        let (status, body) = send(&app, "GET", "/api/weather", Some(&guest), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_comment_flow() {
        let app = test_app().await;
        let (admin, guest) = register_and_login(&app).await;

        let (_, body) = send(
            &app,
            "POST",
            "/api/article",
            Some(&admin),
            Some(json!({"title": "讨论帖", "content": "正文", "classify": "article"})),
        )
        .await;
        let article_id = body["data"]["articleId"].as_i64().unwrap();

        send(
            &app,
            "PATCH",
            &format!("/api/article/{}/status", article_id),
            Some(&admin),
            Some(json!({"state": "published"})),
        )
        .await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/comment",
            Some(&guest),
            Some(json!({"articleId": article_id, "content": "沙发"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let comment_id = body["data"]["commentId"].as_i64().unwrap();

        let (_, body) = send(&app, "GET", "/api/comment/all", Some(&admin), None).await;
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["list"][0]["article"]["title"], "讨论帖");

        // The guest deletes their own comment
        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/comment/{}", comment_id),
            Some(&guest),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
