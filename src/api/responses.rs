//! Shared API response types
//!
//! The success half of the `{ code, message, data }` envelope, plus the
//! pagination wrapper every list endpoint returns. Wire field names are
//! camelCase because that is the contract the admin SPA consumes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::PagedResult;

/// Success envelope. `code` is always 200; resource-creating endpoints
/// answer HTTP 201 while keeping envelope code 200.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            code: 200,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope with a message but no data payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: 200,
            message: message.into(),
            data: None,
        }
    }
}

/// 200 response with data
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(message, data))
}

/// 200 response without data
pub fn ok_message(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse::message(message))
}

/// HTTP 201 with envelope code 200
pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::ok(message, data))).into_response()
}

/// Pagination wrapper for list responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData<T: Serialize> {
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_page: i64,
    pub list: Vec<T>,
}

impl<T: Serialize> PageData<T> {
    /// Convert a repository page, mapping each row to its wire form.
    pub fn from_result<U>(page: PagedResult<U>, f: impl FnMut(U) -> T) -> Self {
        let total_page = page.total_page();
        Self {
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_page,
            list: page.list.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListParams;

    #[test]
    fn test_envelope_omits_missing_data() {
        let json = serde_json::to_value(ApiResponse::message("完成")).unwrap();
        assert_eq!(json["code"], 200);
        assert_eq!(json["message"], "完成");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_envelope_with_data() {
        let json = serde_json::to_value(ApiResponse::ok("查询成功", vec![1, 2, 3])).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_page_data_camel_case() {
        let params = ListParams::checked(2, 10).unwrap();
        let page = PagedResult::new(vec![1, 2], 12, &params);
        let json = serde_json::to_value(PageData::from_result(page, |n| n * 10)).unwrap();

        assert_eq!(json["total"], 12);
        assert_eq!(json["page"], 2);
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["totalPage"], 2);
        assert_eq!(json["list"], serde_json::json!([10, 20]));
    }
}
