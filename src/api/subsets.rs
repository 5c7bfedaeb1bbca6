//! Subset API endpoints
//!
//! - GET    /api/subset      - list categories (any authenticated user)
//! - POST   /api/subset      - create (staff)
//! - PUT    /api/subset/{id} - update (staff)
//! - DELETE /api/subset/{id} - disable (staff)

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{created, ok, ok_message, ApiResponse};
use crate::models::{CreateSubsetInput, Subset, SubsetClassify, UpdateSubsetInput};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsetDto {
    pub id: i64,
    pub subset_name: String,
    pub classify: String,
    pub status: bool,
    pub sort: i64,
    pub created_at: String,
}

impl From<Subset> for SubsetDto {
    fn from(s: Subset) -> Self {
        Self {
            id: s.id,
            subset_name: s.subset_name,
            classify: s.classify.to_string(),
            status: s.status,
            sort: s.sort,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

fn parse_classify(raw: &str) -> Result<SubsetClassify, ApiError> {
    SubsetClassify::from_str(raw)
        .ok_or_else(|| ApiError::bad_request("分类类型仅支持 article/image/resource"))
}

#[derive(Debug, Deserialize)]
pub struct ListSubsetsQuery {
    pub classify: Option<String>,
}

/// GET /api/subset
pub async fn list_subsets(
    State(state): State<AppState>,
    Query(query): Query<ListSubsetsQuery>,
) -> Result<Json<ApiResponse<Vec<SubsetDto>>>, ApiError> {
    let classify = query.classify.as_deref().map(parse_classify).transpose()?;
    let subsets = state.subset_service.list(classify).await?;

    Ok(ok(
        "查询成功",
        subsets.into_iter().map(SubsetDto::from).collect::<Vec<_>>(),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubsetRequest {
    pub subset_name: Option<String>,
    pub classify: Option<String>,
    pub sort: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsetCreatedData {
    pub subset_id: i64,
}

/// POST /api/subset
pub async fn create_subset(
    State(state): State<AppState>,
    Json(body): Json<CreateSubsetRequest>,
) -> Result<Response, ApiError> {
    let (subset_name, classify) = match (body.subset_name, body.classify) {
        (Some(name), Some(classify)) if !name.is_empty() => (name, classify),
        _ => return Err(ApiError::bad_request("分类名称、分类类型不能为空")),
    };

    let subset_id = state
        .subset_service
        .create(CreateSubsetInput {
            subset_name,
            classify: parse_classify(&classify)?,
            sort: body.sort.unwrap_or(0),
        })
        .await?;

    Ok(created("分类创建成功", SubsetCreatedData { subset_id }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubsetRequest {
    pub subset_name: Option<String>,
    pub sort: Option<i64>,
    pub status: Option<bool>,
}

/// PUT /api/subset/{id}
pub async fn update_subset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateSubsetRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .subset_service
        .update(
            id,
            UpdateSubsetInput {
                subset_name: body.subset_name,
                sort: body.sort,
                status: body.status,
            },
        )
        .await?;
    Ok(ok_message("分类更新成功"))
}

/// DELETE /api/subset/{id}
pub async fn delete_subset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.subset_service.disable(id).await?;
    Ok(ok_message("分类删除成功"))
}
