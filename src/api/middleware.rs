//! API middleware
//!
//! Contains:
//! - `AppState` with the shared services
//! - `ApiError`, the error half of the response envelope
//! - Bearer-token authentication and staff authorization middleware

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::services::{
    Actor, ArticleService, CommentService, DiaryService, FileService, MessageService,
    ServiceError, SubsetService, TokenService, UserService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub article_service: Arc<ArticleService>,
    pub comment_service: Arc<CommentService>,
    pub message_service: Arc<MessageService>,
    pub subset_service: Arc<SubsetService>,
    pub file_service: Arc<FileService>,
    pub diary_service: Arc<DiaryService>,
    pub token_service: Arc<TokenService>,
}

/// Authenticated caller extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthUser(pub Actor);

/// Error half of the `{ code, message }` response envelope.
///
/// `code` doubles as the HTTP status: 400, 401, 403, 404 or 500.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::bad_request(msg),
            ServiceError::Authentication(msg) => Self::bad_request(msg),
            ServiceError::Forbidden(msg) => Self::forbidden(msg),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                Self::internal_error("服务器内部错误")
            }
        }
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(request: &Request) -> Option<String> {
    let auth_header = request.headers().get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Authentication middleware: verifies the bearer token and attaches the
/// caller's identity to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| ApiError::unauthorized("请求头未携带 Token 请先登录"))?;

    let claims = state
        .token_service
        .verify(&token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    request
        .extensions_mut()
        .insert(AuthUser(Actor::new(claims.sub, claims.user_type)));
    Ok(next.run(request).await)
}

/// Staff authorization middleware, layered inside `require_auth`.
pub async fn require_staff(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("请求头未携带 Token 请先登录"))?;

    if !user.0.is_staff() {
        return Err(ApiError::forbidden("需要管理员或编辑权限"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: &str) -> Request<Body> {
        Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let request = request_with_auth("Bearer token-123");
        assert_eq!(
            extract_bearer_token(&request),
            Some("token-123".to_string())
        );
    }

    #[test]
    fn test_extract_bearer_token_trims_whitespace() {
        let request = request_with_auth("Bearer   spaced  ");
        assert_eq!(extract_bearer_token(&request), Some("spaced".to_string()));
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();
        assert!(extract_bearer_token(&request).is_none());
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let request = request_with_auth("Basic dXNlcjpwYXNz");
        assert!(extract_bearer_token(&request).is_none());
    }

    #[test]
    fn test_extract_bearer_token_empty() {
        let request = request_with_auth("Bearer ");
        assert!(extract_bearer_token(&request).is_none());
    }

    #[test]
    fn test_api_error_codes() {
        assert_eq!(ApiError::bad_request("x").code, 400);
        assert_eq!(ApiError::unauthorized("x").code, 401);
        assert_eq!(ApiError::forbidden("x").code, 403);
        assert_eq!(ApiError::not_found("x").code, 404);
        assert_eq!(ApiError::internal_error("x").code, 500);
    }

    #[test]
    fn test_service_error_mapping() {
        let cases = [
            (ServiceError::Validation("v".into()), 400),
            (ServiceError::Authentication("a".into()), 400),
            (ServiceError::Forbidden("f".into()), 403),
            (ServiceError::NotFound("n".into()), 404),
            (
                ServiceError::Internal(anyhow::anyhow!("database exploded")),
                500,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError::from(err).code, code);
        }
    }

    #[test]
    fn test_internal_error_message_not_leaked() {
        let err = ApiError::from(ServiceError::Internal(anyhow::anyhow!("secret detail")));
        assert_eq!(err.message, "服务器内部错误");
    }
}
