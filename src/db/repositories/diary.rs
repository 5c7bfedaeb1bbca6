//! Diary repository
//!
//! Diary entries joined with the seeded weather dictionary.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{
    CreateDiaryInput, Diary, DiaryWithWeather, ListParams, Mood, PagedResult, UpdateDiaryInput,
    Weather,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Diary repository trait
#[async_trait]
pub trait DiaryRepository: Send + Sync {
    /// Insert a diary entry, returning its id
    async fn create(&self, input: &CreateDiaryInput) -> Result<i64>;

    /// Page through active entries, newest date first, optional mood filter
    async fn list_page(
        &self,
        params: &ListParams,
        mood: Option<Mood>,
    ) -> Result<PagedResult<DiaryWithWeather>>;

    /// Fetch one active entry
    async fn get_by_id(&self, id: i64) -> Result<Option<DiaryWithWeather>>;

    /// Partial update; returns affected row count
    async fn update(&self, id: i64, input: &UpdateDiaryInput) -> Result<u64>;

    /// Logical delete; returns affected row count
    async fn soft_delete(&self, id: i64) -> Result<u64>;

    /// The weather dictionary
    async fn list_weather(&self) -> Result<Vec<Weather>>;
}

/// SQLx-based diary repository supporting both SQLite and MySQL.
pub struct SqlxDiaryRepository {
    pool: DynDatabasePool,
}

impl SqlxDiaryRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn shared(pool: DynDatabasePool) -> Arc<dyn DiaryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl DiaryRepository for SqlxDiaryRepository {
    async fn create(&self, input: &CreateDiaryInput) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn list_page(
        &self,
        params: &ListParams,
        mood: Option<Mood>,
    ) -> Result<PagedResult<DiaryWithWeather>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_page_sqlite(self.pool.as_sqlite().unwrap(), params, mood).await
            }
            DatabaseDriver::Mysql => {
                list_page_mysql(self.pool.as_mysql().unwrap(), params, mood).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<DiaryWithWeather>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdateDiaryInput) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), id, input).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), id, input).await,
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => soft_delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => soft_delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_weather(&self) -> Result<Vec<Weather>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_weather_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_weather_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

const DIARY_COLUMNS: &str = "d.id, d.title, d.content, d.picture, d.weather_id, \
     w.weather_name, w.icon AS weather_icon, d.mood, d.status, d.created_at, d.updated_at";

const DIARY_JOIN: &str = "LEFT JOIN weather w ON d.weather_id = w.id";

/// WHERE clause for listing. Bind order: mood.
fn list_where(mood: Option<Mood>) -> &'static str {
    if mood.is_some() {
        "d.status = 1 AND d.mood = ?"
    } else {
        "d.status = 1"
    }
}

/// SET clause for a partial update. Bind order: title, content, picture,
/// weather_id, mood, updated_at.
fn update_set(input: &UpdateDiaryInput) -> String {
    let mut fields = Vec::new();
    if input.title.is_some() {
        fields.push("title = ?");
    }
    if input.content.is_some() {
        fields.push("content = ?");
    }
    if input.picture.is_some() {
        fields.push("picture = ?");
    }
    if input.weather_id.is_some() {
        fields.push("weather_id = ?");
    }
    if input.mood.is_some() {
        fields.push("mood = ?");
    }
    fields.push("updated_at = ?");
    fields.join(", ")
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, input: &CreateDiaryInput) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO diary (title, content, picture, weather_id, mood, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(&input.picture)
    .bind(input.weather_id)
    .bind(input.mood.as_str())
    .bind(input.created_at)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to create diary entry")?;

    Ok(result.last_insert_rowid())
}

async fn list_page_sqlite(
    pool: &SqlitePool,
    params: &ListParams,
    mood: Option<Mood>,
) -> Result<PagedResult<DiaryWithWeather>> {
    let where_clause = list_where(mood);

    let list_sql = format!(
        "SELECT {} FROM diary d {} WHERE {} ORDER BY d.created_at DESC, d.id DESC LIMIT ? OFFSET ?",
        DIARY_COLUMNS, DIARY_JOIN, where_clause
    );
    let mut query = sqlx::query(&list_sql);
    if let Some(mood) = mood {
        query = query.bind(mood.as_str());
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list diary entries")?;

    let mut list = Vec::with_capacity(rows.len());
    for row in &rows {
        list.push(row_to_diary_sqlite(row)?);
    }

    let total_sql = format!("SELECT COUNT(*) AS total FROM diary d WHERE {}", where_clause);
    let mut query = sqlx::query(&total_sql);
    if let Some(mood) = mood {
        query = query.bind(mood.as_str());
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count diary entries")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<DiaryWithWeather>> {
    let sql = format!(
        "SELECT {} FROM diary d {} WHERE d.id = ? AND d.status = 1",
        DIARY_COLUMNS, DIARY_JOIN
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get diary entry")?;

    row.map(|row| row_to_diary_sqlite(&row)).transpose()
}

async fn update_sqlite(pool: &SqlitePool, id: i64, input: &UpdateDiaryInput) -> Result<u64> {
    if !input.has_changes() {
        return Ok(0);
    }

    let sql = format!(
        "UPDATE diary SET {} WHERE id = ? AND status = 1",
        update_set(input)
    );
    let mut query = sqlx::query(&sql);
    if let Some(title) = &input.title {
        query = query.bind(title);
    }
    if let Some(content) = &input.content {
        query = query.bind(content);
    }
    if let Some(picture) = &input.picture {
        query = query.bind(picture);
    }
    if let Some(weather_id) = input.weather_id {
        query = query.bind(weather_id);
    }
    if let Some(mood) = input.mood {
        query = query.bind(mood.as_str());
    }
    let result = query
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update diary entry")?;
    Ok(result.rows_affected())
}

async fn soft_delete_sqlite(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE diary SET status = 0, updated_at = ? WHERE id = ? AND status = 1")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete diary entry")?;
    Ok(result.rows_affected())
}

async fn list_weather_sqlite(pool: &SqlitePool) -> Result<Vec<Weather>> {
    let rows = sqlx::query("SELECT id, weather_name, icon FROM weather ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to list weather")?;

    Ok(rows
        .iter()
        .map(|row| Weather {
            id: row.get("id"),
            weather_name: row.get("weather_name"),
            icon: row.get("icon"),
        })
        .collect())
}

fn row_to_diary_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<DiaryWithWeather> {
    let mood_str: String = row.get("mood");
    let mood = Mood::from_str(&mood_str)
        .with_context(|| format!("Invalid mood in database: {}", mood_str))?;
    let status: i64 = row.get("status");

    Ok(DiaryWithWeather {
        diary: Diary {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            picture: row.get("picture"),
            weather_id: row.get("weather_id"),
            mood,
            status: status != 0,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        },
        weather_name: row.get("weather_name"),
        weather_icon: row.get("weather_icon"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &CreateDiaryInput) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO diary (title, content, picture, weather_id, mood, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(&input.picture)
    .bind(input.weather_id)
    .bind(input.mood.as_str())
    .bind(input.created_at)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to create diary entry")?;

    Ok(result.last_insert_id() as i64)
}

async fn list_page_mysql(
    pool: &MySqlPool,
    params: &ListParams,
    mood: Option<Mood>,
) -> Result<PagedResult<DiaryWithWeather>> {
    let where_clause = list_where(mood);

    let list_sql = format!(
        "SELECT {} FROM diary d {} WHERE {} ORDER BY d.created_at DESC, d.id DESC LIMIT ? OFFSET ?",
        DIARY_COLUMNS, DIARY_JOIN, where_clause
    );
    let mut query = sqlx::query(&list_sql);
    if let Some(mood) = mood {
        query = query.bind(mood.as_str());
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list diary entries")?;

    let mut list = Vec::with_capacity(rows.len());
    for row in &rows {
        list.push(row_to_diary_mysql(row)?);
    }

    let total_sql = format!("SELECT COUNT(*) AS total FROM diary d WHERE {}", where_clause);
    let mut query = sqlx::query(&total_sql);
    if let Some(mood) = mood {
        query = query.bind(mood.as_str());
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count diary entries")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<DiaryWithWeather>> {
    let sql = format!(
        "SELECT {} FROM diary d {} WHERE d.id = ? AND d.status = 1",
        DIARY_COLUMNS, DIARY_JOIN
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get diary entry")?;

    row.map(|row| row_to_diary_mysql(&row)).transpose()
}

async fn update_mysql(pool: &MySqlPool, id: i64, input: &UpdateDiaryInput) -> Result<u64> {
    if !input.has_changes() {
        return Ok(0);
    }

    let sql = format!(
        "UPDATE diary SET {} WHERE id = ? AND status = 1",
        update_set(input)
    );
    let mut query = sqlx::query(&sql);
    if let Some(title) = &input.title {
        query = query.bind(title);
    }
    if let Some(content) = &input.content {
        query = query.bind(content);
    }
    if let Some(picture) = &input.picture {
        query = query.bind(picture);
    }
    if let Some(weather_id) = input.weather_id {
        query = query.bind(weather_id);
    }
    if let Some(mood) = input.mood {
        query = query.bind(mood.as_str());
    }
    let result = query
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update diary entry")?;
    Ok(result.rows_affected())
}

async fn soft_delete_mysql(pool: &MySqlPool, id: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE diary SET status = 0, updated_at = ? WHERE id = ? AND status = 1")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete diary entry")?;
    Ok(result.rows_affected())
}

async fn list_weather_mysql(pool: &MySqlPool) -> Result<Vec<Weather>> {
    let rows = sqlx::query("SELECT id, weather_name, icon FROM weather ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to list weather")?;

    Ok(rows
        .iter()
        .map(|row| Weather {
            id: row.get("id"),
            weather_name: row.get("weather_name"),
            icon: row.get("icon"),
        })
        .collect())
}

fn row_to_diary_mysql(row: &sqlx::mysql::MySqlRow) -> Result<DiaryWithWeather> {
    let mood_str: String = row.get("mood");
    let mood = Mood::from_str(&mood_str)
        .with_context(|| format!("Invalid mood in database: {}", mood_str))?;
    let status: i64 = row.get("status");

    Ok(DiaryWithWeather {
        diary: Diary {
            id: row.get("id"),
            title: row.get("title"),
            content: row.get("content"),
            picture: row.get("picture"),
            weather_id: row.get("weather_id"),
            mood,
            status: status != 0,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        },
        weather_name: row.get("weather_name"),
        weather_icon: row.get("weather_icon"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::NaiveDate;

    async fn setup() -> SqlxDiaryRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxDiaryRepository::new(pool)
    }

    fn entry(title: &str, mood: Mood, day: u32) -> CreateDiaryInput {
        CreateDiaryInput {
            title: title.to_string(),
            content: "今天的记录".to_string(),
            picture: String::new(),
            weather_id: Some(1),
            mood,
            created_at: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_with_weather() {
        let repo = setup().await;
        let id = repo.create(&entry("第一篇日记", Mood::Happy, 1)).await.unwrap();

        let found = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.diary.title, "第一篇日记");
        assert_eq!(found.diary.mood, Mood::Happy);
        // weather_id 1 is the first seeded dictionary row
        assert_eq!(found.weather_name.as_deref(), Some("晴"));
    }

    #[tokio::test]
    async fn test_list_newest_first_with_mood_filter() {
        let repo = setup().await;
        repo.create(&entry("早", Mood::Calm, 1)).await.unwrap();
        repo.create(&entry("晚", Mood::Happy, 2)).await.unwrap();

        let page = repo.list_page(&ListParams::default(), None).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.list[0].diary.title, "晚");

        let happy = repo
            .list_page(&ListParams::default(), Some(Mood::Happy))
            .await
            .unwrap();
        assert_eq!(happy.total, 1);
        assert_eq!(happy.list[0].diary.title, "晚");
    }

    #[tokio::test]
    async fn test_update_and_soft_delete() {
        let repo = setup().await;
        let id = repo.create(&entry("可编辑", Mood::Calm, 3)).await.unwrap();

        let affected = repo
            .update(
                id,
                &UpdateDiaryInput {
                    mood: Some(Mood::Tired),
                    content: Some("改过的内容".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let found = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.diary.mood, Mood::Tired);
        assert_eq!(found.diary.content, "改过的内容");

        assert_eq!(repo.soft_delete(id).await.unwrap(), 1);
        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert_eq!(repo.soft_delete(id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_weather_dictionary() {
        let repo = setup().await;
        let weather = repo.list_weather().await.unwrap();
        assert_eq!(weather.len(), 6);
        assert_eq!(weather[0].weather_name, "晴");
    }
}
