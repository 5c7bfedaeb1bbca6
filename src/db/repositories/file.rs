//! File metadata repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateFileInput, FileFilter, ListParams, PagedResult, StoredFile};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// File metadata repository trait
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Register file metadata, returning the new id
    async fn create(&self, input: &CreateFileInput) -> Result<i64>;

    /// Page through active files, newest first, with optional filters
    async fn list_page(
        &self,
        params: &ListParams,
        filter: &FileFilter,
    ) -> Result<PagedResult<StoredFile>>;

    /// Logical delete; returns affected row count
    async fn soft_delete(&self, id: i64) -> Result<u64>;
}

/// SQLx-based file repository supporting both SQLite and MySQL.
pub struct SqlxFileRepository {
    pool: DynDatabasePool,
}

impl SqlxFileRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn shared(pool: DynDatabasePool) -> Arc<dyn FileRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl FileRepository for SqlxFileRepository {
    async fn create(&self, input: &CreateFileInput) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn list_page(
        &self,
        params: &ListParams,
        filter: &FileFilter,
    ) -> Result<PagedResult<StoredFile>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_page_sqlite(self.pool.as_sqlite().unwrap(), params, filter).await
            }
            DatabaseDriver::Mysql => {
                list_page_mysql(self.pool.as_mysql().unwrap(), params, filter).await
            }
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => soft_delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => soft_delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

const FILE_COLUMNS: &str = "id, file_name, format, size, url, subset_id, status, created_at";

/// WHERE clause for the listing. Bind order: subset_id, format.
fn list_where(filter: &FileFilter) -> String {
    let mut clause = String::from("status = 1");
    if filter.subset_id.is_some() {
        clause.push_str(" AND subset_id = ?");
    }
    if filter.format.is_some() {
        clause.push_str(" AND format = ?");
    }
    clause
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, input: &CreateFileInput) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO file (file_name, format, size, url, subset_id, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&input.file_name)
    .bind(&input.format)
    .bind(input.size)
    .bind(&input.url)
    .bind(input.subset_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to register file")?;

    Ok(result.last_insert_rowid())
}

async fn list_page_sqlite(
    pool: &SqlitePool,
    params: &ListParams,
    filter: &FileFilter,
) -> Result<PagedResult<StoredFile>> {
    let where_clause = list_where(filter);

    let list_sql = format!(
        "SELECT {} FROM file WHERE {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        FILE_COLUMNS, where_clause
    );
    let mut query = sqlx::query(&list_sql);
    if let Some(subset_id) = filter.subset_id {
        query = query.bind(subset_id);
    }
    if let Some(format) = &filter.format {
        query = query.bind(format);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list files")?;

    let list = rows.iter().map(row_to_file_sqlite).collect();

    let total_sql = format!("SELECT COUNT(*) AS total FROM file WHERE {}", where_clause);
    let mut query = sqlx::query(&total_sql);
    if let Some(subset_id) = filter.subset_id {
        query = query.bind(subset_id);
    }
    if let Some(format) = &filter.format {
        query = query.bind(format);
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count files")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn soft_delete_sqlite(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE file SET status = 0 WHERE id = ? AND status = 1")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete file")?;
    Ok(result.rows_affected())
}

fn row_to_file_sqlite(row: &sqlx::sqlite::SqliteRow) -> StoredFile {
    let status: i64 = row.get("status");
    StoredFile {
        id: row.get("id"),
        file_name: row.get("file_name"),
        format: row.get("format"),
        size: row.get("size"),
        url: row.get("url"),
        subset_id: row.get("subset_id"),
        status: status != 0,
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &CreateFileInput) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO file (file_name, format, size, url, subset_id, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&input.file_name)
    .bind(&input.format)
    .bind(input.size)
    .bind(&input.url)
    .bind(input.subset_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to register file")?;

    Ok(result.last_insert_id() as i64)
}

async fn list_page_mysql(
    pool: &MySqlPool,
    params: &ListParams,
    filter: &FileFilter,
) -> Result<PagedResult<StoredFile>> {
    let where_clause = list_where(filter);

    let list_sql = format!(
        "SELECT {} FROM file WHERE {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        FILE_COLUMNS, where_clause
    );
    let mut query = sqlx::query(&list_sql);
    if let Some(subset_id) = filter.subset_id {
        query = query.bind(subset_id);
    }
    if let Some(format) = &filter.format {
        query = query.bind(format);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list files")?;

    let list = rows.iter().map(row_to_file_mysql).collect();

    let total_sql = format!("SELECT COUNT(*) AS total FROM file WHERE {}", where_clause);
    let mut query = sqlx::query(&total_sql);
    if let Some(subset_id) = filter.subset_id {
        query = query.bind(subset_id);
    }
    if let Some(format) = &filter.format {
        query = query.bind(format);
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count files")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn soft_delete_mysql(pool: &MySqlPool, id: i64) -> Result<u64> {
    let result = sqlx::query("UPDATE file SET status = 0 WHERE id = ? AND status = 1")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete file")?;
    Ok(result.rows_affected())
}

fn row_to_file_mysql(row: &sqlx::mysql::MySqlRow) -> StoredFile {
    let status: i64 = row.get("status");
    StoredFile {
        id: row.get("id"),
        file_name: row.get("file_name"),
        format: row.get("format"),
        size: row.get("size"),
        url: row.get("url"),
        subset_id: row.get("subset_id"),
        status: status != 0,
        created_at: row.get("created_at"),
    }
}
