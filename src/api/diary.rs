//! Diary API endpoints (staff only)
//!
//! - POST   /api/diary       - create an entry
//! - GET    /api/diary       - paginated listing, optional mood filter
//! - GET    /api/diary/{id}  - detail
//! - PUT    /api/diary/{id}  - partial update
//! - DELETE /api/diary/{id}  - logical delete
//! - GET    /api/weather     - the weather dictionary (any authenticated user)

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::common::checked_params;
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{created, ok, ok_message, ApiResponse, PageData};
use crate::models::{
    CreateDiaryInput, DiaryWithWeather, Mood, UpdateDiaryInput, Weather, DEFAULT_PAGE_SIZE,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryDto {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub picture: String,
    pub weather_id: Option<i64>,
    pub weather_name: Option<String>,
    pub weather_icon: Option<String>,
    pub mood: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<DiaryWithWeather> for DiaryDto {
    fn from(row: DiaryWithWeather) -> Self {
        let diary = row.diary;
        Self {
            id: diary.id,
            title: diary.title,
            content: diary.content,
            picture: diary.picture,
            weather_id: diary.weather_id,
            weather_name: row.weather_name,
            weather_icon: row.weather_icon,
            mood: diary.mood.to_string(),
            created_at: diary.created_at.to_string(),
            updated_at: diary.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDto {
    pub id: i64,
    pub weather_name: String,
    pub icon: Option<String>,
}

impl From<Weather> for WeatherDto {
    fn from(w: Weather) -> Self {
        Self {
            id: w.id,
            weather_name: w.weather_name,
            icon: w.icon,
        }
    }
}

fn parse_mood(raw: &str) -> Result<Mood, ApiError> {
    Mood::from_str(raw).ok_or_else(|| {
        ApiError::bad_request("心情仅支持 happy/sad/angry/calm/excited/tired")
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("日期格式无效（应为YYYY-MM-DD）"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiaryRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub picture: Option<String>,
    pub weather_id: Option<i64>,
    pub mood: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryCreatedData {
    pub diary_id: i64,
    pub created_at: String,
}

/// POST /api/diary
pub async fn create_diary(
    State(state): State<AppState>,
    Json(body): Json<CreateDiaryRequest>,
) -> Result<Response, ApiError> {
    let (title, content) = match (body.title, body.content) {
        (Some(title), Some(content)) if !content.is_empty() => (title, content),
        _ => return Err(ApiError::bad_request("日记标题、内容不能为空")),
    };

    let mood = body.mood.as_deref().map(parse_mood).transpose()?.unwrap_or_default();
    let created_at = body
        .created_at
        .as_deref()
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(|| Utc::now().date_naive());

    let diary_id = state
        .diary_service
        .create(CreateDiaryInput {
            title,
            content,
            picture: body.picture.unwrap_or_default(),
            weather_id: body.weather_id,
            mood,
            created_at,
        })
        .await?;

    Ok(created(
        "日记创建成功",
        DiaryCreatedData {
            diary_id,
            created_at: created_at.to_string(),
        },
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDiaryQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub mood: Option<String>,
}

/// GET /api/diary
pub async fn list_diary(
    State(state): State<AppState>,
    Query(query): Query<ListDiaryQuery>,
) -> Result<Json<ApiResponse<PageData<DiaryDto>>>, ApiError> {
    let params = checked_params(query.page, query.page_size, DEFAULT_PAGE_SIZE)?;
    // Unknown mood values are ignored, matching the other list filters
    let mood = query.mood.as_deref().and_then(Mood::from_str);

    let page = state.diary_service.list(&params, mood).await?;
    let message = if page.total > 0 {
        "查询成功"
    } else {
        "暂无日记"
    };

    Ok(ok(message, PageData::from_result(page, DiaryDto::from)))
}

/// GET /api/diary/{id}
pub async fn get_diary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DiaryDto>>, ApiError> {
    let entry = state.diary_service.get(id).await?;
    Ok(ok("查询成功", entry.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiaryRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub picture: Option<String>,
    pub weather_id: Option<i64>,
    pub mood: Option<String>,
}

/// PUT /api/diary/{id}
pub async fn update_diary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateDiaryRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let mood = body.mood.as_deref().map(parse_mood).transpose()?;

    state
        .diary_service
        .update(
            id,
            UpdateDiaryInput {
                title: body.title,
                content: body.content,
                picture: body.picture,
                weather_id: body.weather_id,
                mood,
            },
        )
        .await?;
    Ok(ok_message("日记更新成功"))
}

/// DELETE /api/diary/{id}
pub async fn delete_diary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.diary_service.delete(id).await?;
    Ok(ok_message("日记删除成功"))
}

/// GET /api/weather
pub async fn list_weather(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<WeatherDto>>>, ApiError> {
    let weather = state.diary_service.weather().await?;
    Ok(ok(
        "查询成功",
        weather.into_iter().map(WeatherDto::from).collect::<Vec<_>>(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-11-04").is_ok());
        assert_eq!(parse_date("2025/11/04").unwrap_err().code, 400);
        assert_eq!(parse_date("yesterday").unwrap_err().code, 400);
    }

    #[test]
    fn test_parse_mood() {
        assert!(parse_mood("happy").is_ok());
        assert_eq!(parse_mood("meh").unwrap_err().code, 400);
    }
}
