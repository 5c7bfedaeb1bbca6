//! User API endpoints
//!
//! - GET  /api/user/isRegistered - check whether a mail address is taken
//! - POST /api/user/register     - create an account
//! - POST /api/user/login        - verify credentials and issue a token
//! - GET  /api/user/me           - the authenticated account

use axum::{
    extract::{Query, State},
    response::Response,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthUser};
use crate::api::responses::{created, ok, ApiResponse};
use crate::models::{RegisterInput, User};

/// User payload as the SPA consumes it (password elided)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub mail: String,
    pub user_type: String,
    pub imgurl: Option<String>,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            mail: user.mail,
            user_type: user.user_type.to_string(),
            imgurl: user.imgurl,
            created_at: user.created_at.to_rfc3339(),
            last_login_at: user.last_login_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IsRegisteredQuery {
    pub mail: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsRegisteredData {
    pub is_registered: bool,
    pub mail: String,
}

/// GET /api/user/isRegistered
pub async fn is_registered(
    State(state): State<AppState>,
    Query(query): Query<IsRegisteredQuery>,
) -> Result<Json<ApiResponse<IsRegisteredData>>, ApiError> {
    let mail = query
        .mail
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("请提供邮箱"))?;

    let registered = state.user_service.is_registered(&mail).await?;

    Ok(ok(
        "查询成功",
        IsRegisteredData {
            is_registered: registered,
            mail,
        },
    ))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub mail: Option<String>,
    pub password: Option<String>,
    pub imgurl: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterData {
    pub id: i64,
    pub name: String,
    pub mail: String,
}

/// POST /api/user/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let (name, mail, password) = match (body.name, body.mail, body.password) {
        (Some(name), Some(mail), Some(password)) => (name, mail, password),
        _ => return Err(ApiError::bad_request("请提供用户名、邮箱和密码")),
    };

    let user = state
        .user_service
        .register(RegisterInput {
            name,
            mail,
            password,
            imgurl: body.imgurl,
        })
        .await?;

    Ok(created(
        "注册成功",
        RegisterData {
            id: user.id,
            name: user.username,
            mail: user.mail,
        },
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: UserDto,
}

/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    let (name, password) = match (body.name, body.password) {
        (Some(name), Some(password)) => (name, password),
        _ => return Err(ApiError::bad_request("请提供用户名和密码")),
    };

    let user = state.user_service.login(&name, &password).await?;
    let token = state
        .token_service
        .generate(&user)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(ok(
        "登录成功",
        LoginData {
            token,
            user: user.into(),
        },
    ))
}

/// GET /api/user/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.user_service.get(auth.0.user_id).await?;
    Ok(ok("查询成功", user.into()))
}
