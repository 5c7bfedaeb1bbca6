//! Message API endpoints
//!
//! - POST   /api/message              - send a message
//! - GET    /api/message/inbox        - received messages
//! - GET    /api/message/outbox       - sent messages
//! - PATCH  /api/message/read         - mark one or many as read
//! - DELETE /api/message/{id}         - delete a message
//! - GET    /api/message/unread/count - unread counter

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::common::checked_params;
use crate::api::middleware::{ApiError, AppState, AuthUser};
use crate::api::responses::{created, ok, ok_message, ApiResponse, PageData};
use crate::models::{
    MessageFilter, MessageType, MessageWithUsers, SendMessageInput, MESSAGE_PAGE_SIZE,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: Option<String>,
    pub sender_avatar: Option<String>,
    pub receiver_id: i64,
    pub receiver_name: Option<String>,
    pub receiver_avatar: Option<String>,
    #[serde(rename = "type")]
    pub message_type: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<MessageWithUsers> for MessageDto {
    fn from(m: MessageWithUsers) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            sender_name: m.sender_name,
            sender_avatar: m.sender_avatar,
            receiver_id: m.receiver_id,
            receiver_name: m.receiver_name,
            receiver_avatar: m.receiver_avatar,
            message_type: m.message_type.to_string(),
            content: m.content,
            is_read: m.is_read,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: Option<i64>,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCreatedData {
    pub message_id: i64,
    pub created_at: String,
}

/// POST /api/message
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Response, ApiError> {
    let (receiver_id, message_type, content) =
        match (body.receiver_id, body.message_type, body.content) {
            (Some(receiver_id), Some(message_type), Some(content)) if !content.is_empty() => {
                (receiver_id, message_type, content)
            }
            _ => {
                return Err(ApiError::bad_request(
                    "接收者ID、消息类型、消息内容不能为空",
                ))
            }
        };

    let message_type = MessageType::from_str(&message_type)
        .ok_or_else(|| ApiError::bad_request("消息类型仅支持 system/private/notice"))?;

    let message_id = state
        .message_service
        .send(
            SendMessageInput {
                receiver_id,
                message_type,
                content,
            },
            &auth.0,
        )
        .await?;

    Ok(created(
        "消息发送成功",
        MessageCreatedData {
            message_id,
            created_at: Utc::now().to_rfc3339(),
        },
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub is_read: Option<i64>,
}

/// GET /api/message/inbox
pub async fn inbox(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<MailboxQuery>,
) -> Result<Json<ApiResponse<PageData<MessageDto>>>, ApiError> {
    let params = checked_params(query.page, query.page_size, MESSAGE_PAGE_SIZE)?;

    let filter = MessageFilter {
        message_type: query.message_type.as_deref().and_then(MessageType::from_str),
        is_read: match query.is_read {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
    };

    let page = state.message_service.inbox(&params, &filter, &auth.0).await?;
    let message = if page.total > 0 {
        "收件箱查询成功"
    } else {
        "收件箱暂无消息"
    };

    Ok(ok(message, PageData::from_result(page, MessageDto::from)))
}

/// GET /api/message/outbox
pub async fn outbox(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<MailboxQuery>,
) -> Result<Json<ApiResponse<PageData<MessageDto>>>, ApiError> {
    let params = checked_params(query.page, query.page_size, MESSAGE_PAGE_SIZE)?;
    let message_type = query.message_type.as_deref().and_then(MessageType::from_str);

    let page = state
        .message_service
        .outbox(&params, message_type, &auth.0)
        .await?;
    let message = if page.total > 0 {
        "发件箱查询成功"
    } else {
        "发件箱暂无消息"
    };

    Ok(ok(message, PageData::from_result(page, MessageDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    /// A single id or an array of ids
    pub message_ids: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadData {
    pub marked_count: u64,
    pub updated_at: String,
}

fn collect_ids(value: &serde_json::Value) -> Vec<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().into_iter().collect(),
        serde_json::Value::Array(items) => items.iter().filter_map(|v| v.as_i64()).collect(),
        _ => Vec::new(),
    }
}

/// PATCH /api/message/read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<MarkReadRequest>,
) -> Result<Json<ApiResponse<MarkReadData>>, ApiError> {
    let ids = body
        .message_ids
        .as_ref()
        .map(collect_ids)
        .unwrap_or_default();
    if ids.is_empty() {
        return Err(ApiError::bad_request("请传入有效的消息ID(单个或数组)"));
    }

    let marked = state.message_service.mark_read(&ids, &auth.0).await?;

    Ok(ok(
        format!("成功标记 {} 条消息为已读", marked),
        MarkReadData {
            marked_count: marked,
            updated_at: Utc::now().to_rfc3339(),
        },
    ))
}

/// DELETE /api/message/{id}
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.message_service.delete(id, &auth.0).await?;
    Ok(ok_message("消息删除成功"))
}

#[derive(Debug, Deserialize)]
pub struct UnreadCountQuery {
    #[serde(rename = "type")]
    pub message_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountData {
    pub unread_count: i64,
    #[serde(rename = "type")]
    pub message_type: String,
}

/// GET /api/message/unread/count
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<UnreadCountQuery>,
) -> Result<Json<ApiResponse<UnreadCountData>>, ApiError> {
    let message_type = query.message_type.as_deref().and_then(MessageType::from_str);
    let count = state.message_service.unread_count(message_type, &auth.0).await?;

    Ok(ok(
        "未读消息数量查询成功",
        UnreadCountData {
            unread_count: count,
            message_type: message_type
                .map(|t| t.to_string())
                .unwrap_or_else(|| "all".to_string()),
        },
    ))
}
