//! Diary service
//!
//! The diary is the blogger's private journal; route-level authorization
//! already restricts it to staff, the service validates the entries.

use crate::db::repositories::DiaryRepository;
use crate::models::{
    CreateDiaryInput, DiaryWithWeather, ListParams, Mood, PagedResult, UpdateDiaryInput, Weather,
    DIARY_TITLE_MAX_LEN,
};
use crate::services::ServiceError;
use anyhow::Context;
use std::sync::Arc;

pub struct DiaryService {
    repo: Arc<dyn DiaryRepository>,
}

impl DiaryService {
    pub fn new(repo: Arc<dyn DiaryRepository>) -> Self {
        Self { repo }
    }

    fn validate_title(title: &str) -> Result<(), ServiceError> {
        let chars = title.chars().count();
        if chars < 1 || chars > DIARY_TITLE_MAX_LEN {
            return Err(ServiceError::Validation(
                "日记标题长度需在1-100字之间".to_string(),
            ));
        }
        Ok(())
    }

    /// Create an entry for a given date.
    pub async fn create(&self, input: CreateDiaryInput) -> Result<i64, ServiceError> {
        Self::validate_title(&input.title)?;
        if input.content.trim().is_empty() {
            return Err(ServiceError::Validation("日记内容不能为空".to_string()));
        }

        let id = self
            .repo
            .create(&input)
            .await
            .context("Failed to create diary entry")?;
        Ok(id)
    }

    /// Paginated listing, newest date first, optional mood filter.
    pub async fn list(
        &self,
        params: &ListParams,
        mood: Option<Mood>,
    ) -> Result<PagedResult<DiaryWithWeather>, ServiceError> {
        let page = self
            .repo
            .list_page(params, mood)
            .await
            .context("Failed to list diary entries")?;
        Ok(page)
    }

    /// Fetch one entry.
    pub async fn get(&self, id: i64) -> Result<DiaryWithWeather, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get diary entry")?
            .ok_or_else(|| ServiceError::NotFound("日记不存在".to_string()))
    }

    /// Partial update.
    pub async fn update(&self, id: i64, input: UpdateDiaryInput) -> Result<(), ServiceError> {
        if !input.has_changes() {
            return Err(ServiceError::Validation(
                "请传入至少一个更新字段".to_string(),
            ));
        }
        if let Some(title) = &input.title {
            Self::validate_title(title)?;
        }

        let affected = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update diary entry")?;
        if affected == 0 {
            return Err(ServiceError::NotFound("日记不存在".to_string()));
        }
        Ok(())
    }

    /// Logical delete.
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let affected = self
            .repo
            .soft_delete(id)
            .await
            .context("Failed to delete diary entry")?;
        if affected == 0 {
            return Err(ServiceError::NotFound("日记不存在".to_string()));
        }
        Ok(())
    }

    /// The seeded weather dictionary.
    pub async fn weather(&self) -> Result<Vec<Weather>, ServiceError> {
        let weather = self
            .repo
            .list_weather()
            .await
            .context("Failed to list weather")?;
        Ok(weather)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxDiaryRepository;
    use crate::db::{create_test_pool, migrations};
    use chrono::NaiveDate;

    async fn setup() -> DiaryService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        DiaryService::new(SqlxDiaryRepository::shared(pool))
    }

    fn entry(title: &str) -> CreateDiaryInput {
        CreateDiaryInput {
            title: title.to_string(),
            content: "记录".to_string(),
            picture: String::new(),
            weather_id: None,
            mood: Mood::Calm,
            created_at: NaiveDate::from_ymd_opt(2025, 11, 4).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_title_validation() {
        let service = setup().await;

        assert!(matches!(
            service.create(entry("")).await,
            Err(ServiceError::Validation(_))
        ));

        let long = "日".repeat(101);
        assert!(matches!(
            service.create(entry(&long)).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let service = setup().await;
        let id = service.create(entry("今天")).await.unwrap();

        let found = service.get(id).await.unwrap();
        assert_eq!(found.diary.title, "今天");

        service
            .update(
                id,
                UpdateDiaryInput {
                    mood: Some(Mood::Happy),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(service.get(id).await.unwrap().diary.mood, Mood::Happy);

        service.delete(id).await.unwrap();
        assert!(matches!(service.get(id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_weather_dictionary_available() {
        let service = setup().await;
        assert_eq!(service.weather().await.unwrap().len(), 6);
    }
}
