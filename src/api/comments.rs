//! Comment API endpoints
//!
//! - GET    /api/comment/all  - all active comments, newest first
//! - POST   /api/comment      - comment on an article (or reply)
//! - GET    /api/comment/my   - the caller's comments
//! - DELETE /api/comment/{id} - logical delete

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::common::{default_params, PaginationQuery};
use crate::api::middleware::{ApiError, AppState, AuthUser};
use crate::api::responses::{created, ok, ok_message, ApiResponse, PageData};
use crate::models::{CommentWithMeta, CreateCommentInput};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub article: CommentArticleDto,
    pub parent_id: i64,
    pub content: String,
    pub complaint: i64,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct CommentArticleDto {
    pub id: i64,
    pub title: String,
}

impl From<CommentWithMeta> for CommentDto {
    fn from(meta: CommentWithMeta) -> Self {
        Self {
            id: meta.id,
            user_id: meta.user_id,
            user_name: meta.user_name,
            article: CommentArticleDto {
                id: meta.article_id,
                // Placeholder when the article row is gone
                title: meta.article_title.unwrap_or_else(|| "文章已删除".to_string()),
            },
            parent_id: meta.parent_id,
            content: meta.content,
            complaint: meta.complaint,
            is_read: meta.is_read,
            created_at: meta.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/comment/all
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<PageData<CommentDto>>>, ApiError> {
    let params = default_params(&query)?;
    let page = state.comment_service.list_all(&params).await?;
    Ok(ok("查询成功", PageData::from_result(page, CommentDto::from)))
}

/// GET /api/comment/my
pub async fn list_my_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<PageData<CommentDto>>>, ApiError> {
    let params = default_params(&query)?;
    let page = state.comment_service.list_mine(&params, &auth.0).await?;
    Ok(ok("查询成功", PageData::from_result(page, CommentDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub article_id: Option<i64>,
    pub content: Option<String>,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreatedData {
    pub comment_id: i64,
    pub created_at: String,
}

/// POST /api/comment
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<Response, ApiError> {
    let (article_id, content) = match (body.article_id, body.content) {
        (Some(article_id), Some(content)) if !content.is_empty() => (article_id, content),
        _ => return Err(ApiError::bad_request("文章ID、评论内容不能为空")),
    };

    let comment_id = state
        .comment_service
        .create(
            CreateCommentInput {
                article_id,
                content,
                parent_id: body.parent_id.unwrap_or(0),
            },
            &auth.0,
        )
        .await?;

    Ok(created(
        "评论成功",
        CommentCreatedData {
            comment_id,
            created_at: Utc::now().to_rfc3339(),
        },
    ))
}

/// DELETE /api/comment/{id}
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.comment_service.delete(id, &auth.0).await?;
    Ok(ok_message("评论删除成功"))
}
