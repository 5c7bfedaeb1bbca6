//! Subset repository
//!
//! Categories for articles, image collections and resources.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateSubsetInput, Subset, SubsetClassify, UpdateSubsetInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Subset repository trait
#[async_trait]
pub trait SubsetRepository: Send + Sync {
    /// Insert a subset, returning its id
    async fn create(&self, input: &CreateSubsetInput) -> Result<i64>;

    /// Fetch a subset by id
    async fn get_by_id(&self, id: i64) -> Result<Option<Subset>>;

    /// List subsets, optionally by classify, enabled first then by weight
    async fn list(&self, classify: Option<SubsetClassify>) -> Result<Vec<Subset>>;

    /// Partial update; returns affected row count
    async fn update(&self, id: i64, input: &UpdateSubsetInput) -> Result<u64>;

    /// Disable a subset (status := 0); returns affected row count
    async fn disable(&self, id: i64) -> Result<u64>;
}

/// SQLx-based subset repository supporting both SQLite and MySQL.
pub struct SqlxSubsetRepository {
    pool: DynDatabasePool,
}

impl SqlxSubsetRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn shared(pool: DynDatabasePool) -> Arc<dyn SubsetRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SubsetRepository for SqlxSubsetRepository {
    async fn create(&self, input: &CreateSubsetInput) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Subset>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self, classify: Option<SubsetClassify>) -> Result<Vec<Subset>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap(), classify).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap(), classify).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdateSubsetInput) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), id, input).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), id, input).await,
        }
    }

    async fn disable(&self, id: i64) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => disable_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => disable_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

const SUBSET_COLUMNS: &str =
    "id, subset_name, classify, status, sort, created_at, updated_at";

/// SET clause for a partial update. Bind order: name, sort, status, updated_at.
fn update_set(input: &UpdateSubsetInput) -> String {
    let mut fields = Vec::new();
    if input.subset_name.is_some() {
        fields.push("subset_name = ?");
    }
    if input.sort.is_some() {
        fields.push("sort = ?");
    }
    if input.status.is_some() {
        fields.push("status = ?");
    }
    fields.push("updated_at = ?");
    fields.join(", ")
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, input: &CreateSubsetInput) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO subset (subset_name, classify, sort, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&input.subset_name)
    .bind(input.classify.as_str())
    .bind(input.sort)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create subset")?;

    Ok(result.last_insert_rowid())
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Subset>> {
    let row = sqlx::query(&format!("SELECT {} FROM subset WHERE id = ?", SUBSET_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get subset")?;

    row.map(|row| row_to_subset_sqlite(&row)).transpose()
}

async fn list_sqlite(pool: &SqlitePool, classify: Option<SubsetClassify>) -> Result<Vec<Subset>> {
    let mut sql = format!("SELECT {} FROM subset", SUBSET_COLUMNS);
    if classify.is_some() {
        sql.push_str(" WHERE classify = ?");
    }
    sql.push_str(" ORDER BY status DESC, sort DESC, id ASC");

    let mut query = sqlx::query(&sql);
    if let Some(c) = classify {
        query = query.bind(c.as_str());
    }
    let rows = query.fetch_all(pool).await.context("Failed to list subsets")?;

    rows.iter().map(row_to_subset_sqlite).collect()
}

async fn update_sqlite(pool: &SqlitePool, id: i64, input: &UpdateSubsetInput) -> Result<u64> {
    if !input.has_changes() {
        return Ok(0);
    }

    let sql = format!("UPDATE subset SET {} WHERE id = ?", update_set(input));
    let mut query = sqlx::query(&sql);
    if let Some(name) = &input.subset_name {
        query = query.bind(name);
    }
    if let Some(sort) = input.sort {
        query = query.bind(sort);
    }
    if let Some(status) = input.status {
        query = query.bind(status as i64);
    }
    let result = query
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update subset")?;
    Ok(result.rows_affected())
}

async fn disable_sqlite(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE subset SET status = 0, updated_at = ? WHERE id = ? AND status = 1")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to disable subset")?;
    Ok(result.rows_affected())
}

fn row_to_subset_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Subset> {
    let classify_str: String = row.get("classify");
    let classify = SubsetClassify::from_str(&classify_str)
        .with_context(|| format!("Invalid subset classify in database: {}", classify_str))?;
    let status: i64 = row.get("status");

    Ok(Subset {
        id: row.get("id"),
        subset_name: row.get("subset_name"),
        classify,
        status: status != 0,
        sort: row.get("sort"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &CreateSubsetInput) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO subset (subset_name, classify, sort, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&input.subset_name)
    .bind(input.classify.as_str())
    .bind(input.sort)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create subset")?;

    Ok(result.last_insert_id() as i64)
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Subset>> {
    let row = sqlx::query(&format!("SELECT {} FROM subset WHERE id = ?", SUBSET_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get subset")?;

    row.map(|row| row_to_subset_mysql(&row)).transpose()
}

async fn list_mysql(pool: &MySqlPool, classify: Option<SubsetClassify>) -> Result<Vec<Subset>> {
    let mut sql = format!("SELECT {} FROM subset", SUBSET_COLUMNS);
    if classify.is_some() {
        sql.push_str(" WHERE classify = ?");
    }
    sql.push_str(" ORDER BY status DESC, sort DESC, id ASC");

    let mut query = sqlx::query(&sql);
    if let Some(c) = classify {
        query = query.bind(c.as_str());
    }
    let rows = query.fetch_all(pool).await.context("Failed to list subsets")?;

    rows.iter().map(row_to_subset_mysql).collect()
}

async fn update_mysql(pool: &MySqlPool, id: i64, input: &UpdateSubsetInput) -> Result<u64> {
    if !input.has_changes() {
        return Ok(0);
    }

    let sql = format!("UPDATE subset SET {} WHERE id = ?", update_set(input));
    let mut query = sqlx::query(&sql);
    if let Some(name) = &input.subset_name {
        query = query.bind(name);
    }
    if let Some(sort) = input.sort {
        query = query.bind(sort);
    }
    if let Some(status) = input.status {
        query = query.bind(status as i64);
    }
    let result = query
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update subset")?;
    Ok(result.rows_affected())
}

async fn disable_mysql(pool: &MySqlPool, id: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE subset SET status = 0, updated_at = ? WHERE id = ? AND status = 1")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to disable subset")?;
    Ok(result.rows_affected())
}

fn row_to_subset_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Subset> {
    let classify_str: String = row.get("classify");
    let classify = SubsetClassify::from_str(&classify_str)
        .with_context(|| format!("Invalid subset classify in database: {}", classify_str))?;
    let status: i64 = row.get("status");

    Ok(Subset {
        id: row.get("id"),
        subset_name: row.get("subset_name"),
        classify,
        status: status != 0,
        sort: row.get("sort"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxSubsetRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxSubsetRepository::new(pool)
    }

    fn input(name: &str, classify: SubsetClassify, sort: i64) -> CreateSubsetInput {
        CreateSubsetInput {
            subset_name: name.to_string(),
            classify,
            sort,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_ordering() {
        let repo = setup().await;
        repo.create(&input("随笔", SubsetClassify::Article, 1)).await.unwrap();
        repo.create(&input("技术", SubsetClassify::Article, 10)).await.unwrap();
        repo.create(&input("壁纸", SubsetClassify::Image, 5)).await.unwrap();

        let articles = repo.list(Some(SubsetClassify::Article)).await.unwrap();
        assert_eq!(articles.len(), 2);
        // Higher sort weight first
        assert_eq!(articles[0].subset_name, "技术");

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_same_name_different_classify_allowed() {
        let repo = setup().await;
        repo.create(&input("收藏", SubsetClassify::Article, 0)).await.unwrap();
        repo.create(&input("收藏", SubsetClassify::Image, 0)).await.unwrap();

        let dup = repo.create(&input("收藏", SubsetClassify::Article, 0)).await;
        assert!(dup.is_err(), "(name, classify) pair must be unique");
    }

    #[tokio::test]
    async fn test_update_and_disable() {
        let repo = setup().await;
        let id = repo.create(&input("旧名", SubsetClassify::Article, 0)).await.unwrap();

        let affected = repo
            .update(
                id,
                &UpdateSubsetInput {
                    subset_name: Some("新名".to_string()),
                    sort: Some(7),
                    status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let subset = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(subset.subset_name, "新名");
        assert_eq!(subset.sort, 7);
        assert!(subset.status);

        assert_eq!(repo.disable(id).await.unwrap(), 1);
        assert_eq!(repo.disable(id).await.unwrap(), 0);
        let subset = repo.get_by_id(id).await.unwrap().unwrap();
        assert!(!subset.status);
    }
}
