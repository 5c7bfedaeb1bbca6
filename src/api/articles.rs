//! Article API endpoints
//!
//! - POST   /api/article             - create (saved as draft)
//! - GET    /api/article             - paginated listing with filters
//! - GET    /api/article/{id}        - detail
//! - PUT    /api/article/{id}        - partial update
//! - PATCH  /api/article/{id}/status - lifecycle transition
//! - DELETE /api/article/{id}        - logical delete
//! - POST   /api/article/{id}/praise - toggle the caller's like

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
    ArticleFilter, ArticleState, ArticleWithSubset, Classify, CreateArticleInput,
    UpdateArticleInput, DEFAULT_PAGE_SIZE,
};

/// Article payload in list and detail responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
    pub id: i64,
    pub title: String,
    pub subset_id: Option<i64>,
    pub subset_name: Option<String>,
    pub classify: String,
    pub label: String,
    pub introduce: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    pub cover: String,
    pub user_id: i64,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: Option<String>,
}

impl From<ArticleWithSubset> for ArticleDto {
    fn from(row: ArticleWithSubset) -> Self {
        let article = row.article;
        Self {
            id: article.id,
            title: article.title,
            subset_id: article.subset_id,
            subset_name: row.subset_name,
            classify: article.classify.to_string(),
            label: article.label,
            introduce: article.introduce,
            content: article.content,
            cover: article.cover,
            user_id: article.user_id,
            views: article.views,
            likes: article.likes,
            comments: article.comments,
            state: article.state.to_string(),
            created_at: article.created_at.to_rfc3339(),
            updated_at: article.updated_at.to_rfc3339(),
            published_at: article.published_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

fn parse_classify(raw: &str) -> Result<Classify, ApiError> {
    Classify::from_str(raw)
        .ok_or_else(|| ApiError::bad_request("内容类型仅支持 article（文章）/ image（图片集）"))
}

fn parse_state(raw: &str) -> Result<ArticleState, ApiError> {
    match ArticleState::from_str(raw) {
        Some(state) if state.is_assignable() => Ok(state),
        _ => Err(ApiError::bad_request("状态仅支持 draft/published/rejected")),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub classify: Option<String>,
    pub subset_id: Option<i64>,
    pub label: Option<String>,
    pub introduce: Option<String>,
    pub cover: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCreatedData {
    pub article_id: i64,
    pub created_at: String,
}

/// POST /api/article
pub async fn create_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateArticleRequest>,
) -> Result<Response, ApiError> {
    let (title, content, classify) = match (body.title, body.content, body.classify) {
        (Some(title), Some(content), Some(classify))
            if !title.is_empty() && !content.is_empty() =>
        {
            (title, content, classify)
        }
        _ => {
            return Err(ApiError::bad_request(
                "文章标题、内容、内容类型（classify）不能为空",
            ))
        }
    };

    let input = CreateArticleInput {
        title,
        content,
        classify: parse_classify(&classify)?,
        subset_id: body.subset_id,
        label: body.label.unwrap_or_default(),
        introduce: body.introduce.unwrap_or_default(),
        cover: body.cover.unwrap_or_default(),
    };

    let article_id = state.article_service.create(input, &auth.0).await?;

    Ok(created(
        "文章创建成功（默认保存为草稿）",
        ArticleCreatedData {
            article_id,
            created_at: Utc::now().to_rfc3339(),
        },
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListArticlesQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub state: Option<String>,
    pub classify: Option<String>,
    pub subset_id: Option<i64>,
}

/// GET /api/article
pub async fn list_articles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<Json<ApiResponse<PageData<ArticleDto>>>, ApiError> {
    let params = checked_params(query.page, query.page_size, DEFAULT_PAGE_SIZE)?;

    // Unknown filter values are simply ignored
    let filter = ArticleFilter {
        state: query
            .state
            .as_deref()
            .and_then(ArticleState::from_str)
            .filter(|s| s.is_assignable()),
        classify: query.classify.as_deref().and_then(Classify::from_str),
        subset_id: query.subset_id,
    };

    let page = state.article_service.list(&params, &filter, &auth.0).await?;
    let message = if page.total > 0 {
        "查询成功"
    } else {
        "暂无相关文章"
    };

    Ok(ok(message, PageData::from_result(page, ArticleDto::from)))
}

/// GET /api/article/{id}
pub async fn get_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ArticleDto>>, ApiError> {
    let article = state.article_service.get(id, &auth.0).await?;
    Ok(ok("查询成功", article.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub classify: Option<String>,
    pub subset_id: Option<i64>,
    pub label: Option<String>,
    pub introduce: Option<String>,
    pub cover: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleUpdatedData {
    pub article_id: i64,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// PUT /api/article/{id}
pub async fn update_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateArticleRequest>,
) -> Result<Json<ApiResponse<ArticleUpdatedData>>, ApiError> {
    let new_state = body.state.as_deref().map(parse_state).transpose()?;
    let classify = body.classify.as_deref().map(parse_classify).transpose()?;

    let input = UpdateArticleInput {
        title: body.title,
        content: body.content,
        classify,
        subset_id: body.subset_id,
        label: body.label,
        introduce: body.introduce,
        cover: body.cover,
        state: new_state,
    };

    state.article_service.update(id, input, &auth.0).await?;

    Ok(ok(
        "文章更新成功",
        ArticleUpdatedData {
            article_id: id,
            updated_at: Utc::now().to_rfc3339(),
            state: new_state.map(|s| s.to_string()),
        },
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub state: Option<String>,
}

/// PATCH /api/article/{id}/status
pub async fn update_article_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<ArticleUpdatedData>>, ApiError> {
    let raw = body
        .state
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("状态值不能为空"))?;
    let new_state = match ArticleState::from_str(&raw) {
        Some(state) if state.is_assignable() => state,
        _ => {
            return Err(ApiError::bad_request(
                "状态值无效，仅支持 draft（草稿）/ published（已发布）/ rejected（已驳回）",
            ))
        }
    };

    state
        .article_service
        .update_state(id, new_state, &auth.0)
        .await?;

    let state_label = match new_state {
        ArticleState::Draft => "草稿",
        ArticleState::Published => "已发布",
        ArticleState::Rejected => "已驳回",
        ArticleState::Deleted => "已删除",
    };

    Ok(ok(
        format!("文章状态已更新为{}", state_label),
        ArticleUpdatedData {
            article_id: id,
            updated_at: Utc::now().to_rfc3339(),
            state: Some(new_state.to_string()),
        },
    ))
}

/// DELETE /api/article/{id}
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.article_service.delete(id, &auth.0).await?;
    Ok(ok_message("文章删除成功"))
}

#[derive(Debug, Serialize)]
pub struct PraiseData {
    pub liked: bool,
}

/// POST /api/article/{id}/praise
pub async fn praise_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PraiseData>>, ApiError> {
    let liked = state.article_service.praise(id, &auth.0).await?;
    let message = if liked { "点赞成功" } else { "已取消点赞" };
    Ok(ok(message, PraiseData { liked }))
}
