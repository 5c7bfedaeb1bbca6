//! File API endpoints
//!
//! Metadata for files living under the static data directory; the bytes
//! themselves are served by the HTTP layer's static file service.
//!
//! - GET    /api/file      - paginated listing
//! - POST   /api/file      - register metadata
//! - DELETE /api/file/{id} - logical delete

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::common::checked_params;
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{created, ok, ok_message, ApiResponse, PageData};
use crate::models::{CreateFileInput, FileFilter, StoredFile, DEFAULT_PAGE_SIZE};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDto {
    pub id: i64,
    pub file_name: String,
    pub format: String,
    pub size: Option<i64>,
    pub url: String,
    pub subset_id: Option<i64>,
    pub created_at: String,
}

impl From<StoredFile> for FileDto {
    fn from(f: StoredFile) -> Self {
        Self {
            id: f.id,
            file_name: f.file_name,
            format: f.format,
            size: f.size,
            url: f.url,
            subset_id: f.subset_id,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub subset_id: Option<i64>,
    pub format: Option<String>,
}

/// GET /api/file
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<PageData<FileDto>>>, ApiError> {
    let params = checked_params(query.page, query.page_size, DEFAULT_PAGE_SIZE)?;
    let filter = FileFilter {
        subset_id: query.subset_id,
        format: query.format.map(|f| f.to_lowercase()),
    };

    let page = state.file_service.list(&params, &filter).await?;
    Ok(ok("查询成功", PageData::from_result(page, FileDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    pub file_name: Option<String>,
    pub format: Option<String>,
    pub size: Option<i64>,
    pub url: Option<String>,
    pub subset_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCreatedData {
    pub file_id: i64,
}

/// POST /api/file
pub async fn create_file(
    State(state): State<AppState>,
    Json(body): Json<CreateFileRequest>,
) -> Result<Response, ApiError> {
    let (file_name, format, url) = match (body.file_name, body.format, body.url) {
        (Some(file_name), Some(format), Some(url)) => (file_name, format, url),
        _ => return Err(ApiError::bad_request("文件名、格式、地址不能为空")),
    };

    let file_id = state
        .file_service
        .create(CreateFileInput {
            file_name,
            format,
            size: body.size,
            url,
            subset_id: body.subset_id,
        })
        .await?;

    Ok(created("文件登记成功", FileCreatedData { file_id }))
}

/// DELETE /api/file/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.file_service.delete(id).await?;
    Ok(ok_message("文件删除成功"))
}
