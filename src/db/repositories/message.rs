//! Message repository
//!
//! Inbox and outbox are two views over the message table, joined with the
//! counterpart account's display info. Deletes are physical; read marking
//! only touches the caller's own unread inbox rows.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{
    ListParams, MessageFilter, MessageType, MessageWithUsers, PagedResult, SendMessageInput,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Message repository trait
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Insert a message, returning its id
    async fn create(&self, input: &SendMessageInput, sender_id: i64) -> Result<i64>;

    /// Page through the user's inbox (receiver side)
    async fn inbox_page(
        &self,
        params: &ListParams,
        filter: &MessageFilter,
        user_id: i64,
    ) -> Result<PagedResult<MessageWithUsers>>;

    /// Page through the user's outbox (sender side)
    async fn outbox_page(
        &self,
        params: &ListParams,
        message_type: Option<MessageType>,
        user_id: i64,
    ) -> Result<PagedResult<MessageWithUsers>>;

    /// Mark the caller's unread inbox messages as read, returning the count
    async fn mark_read(&self, ids: &[i64], user_id: i64) -> Result<u64>;

    /// Physically delete a message the user sent or received
    async fn delete(&self, id: i64, user_id: i64) -> Result<u64>;

    /// Count unread inbox messages, optionally per type
    async fn unread_count(&self, user_id: i64, message_type: Option<MessageType>) -> Result<i64>;
}

/// SQLx-based message repository supporting both SQLite and MySQL.
pub struct SqlxMessageRepository {
    pool: DynDatabasePool,
}

impl SqlxMessageRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn shared(pool: DynDatabasePool) -> Arc<dyn MessageRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl MessageRepository for SqlxMessageRepository {
    async fn create(&self, input: &SendMessageInput, sender_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), input, sender_id).await
            }
            DatabaseDriver::Mysql => {
                create_mysql(self.pool.as_mysql().unwrap(), input, sender_id).await
            }
        }
    }

    async fn inbox_page(
        &self,
        params: &ListParams,
        filter: &MessageFilter,
        user_id: i64,
    ) -> Result<PagedResult<MessageWithUsers>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                inbox_page_sqlite(self.pool.as_sqlite().unwrap(), params, filter, user_id).await
            }
            DatabaseDriver::Mysql => {
                inbox_page_mysql(self.pool.as_mysql().unwrap(), params, filter, user_id).await
            }
        }
    }

    async fn outbox_page(
        &self,
        params: &ListParams,
        message_type: Option<MessageType>,
        user_id: i64,
    ) -> Result<PagedResult<MessageWithUsers>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                outbox_page_sqlite(self.pool.as_sqlite().unwrap(), params, message_type, user_id)
                    .await
            }
            DatabaseDriver::Mysql => {
                outbox_page_mysql(self.pool.as_mysql().unwrap(), params, message_type, user_id)
                    .await
            }
        }
    }

    async fn mark_read(&self, ids: &[i64], user_id: i64) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                mark_read_sqlite(self.pool.as_sqlite().unwrap(), ids, user_id).await
            }
            DatabaseDriver::Mysql => {
                mark_read_mysql(self.pool.as_mysql().unwrap(), ids, user_id).await
            }
        }
    }

    async fn delete(&self, id: i64, user_id: i64) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_sqlite(self.pool.as_sqlite().unwrap(), id, user_id).await
            }
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id, user_id).await,
        }
    }

    async fn unread_count(&self, user_id: i64, message_type: Option<MessageType>) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                unread_count_sqlite(self.pool.as_sqlite().unwrap(), user_id, message_type).await
            }
            DatabaseDriver::Mysql => {
                unread_count_mysql(self.pool.as_mysql().unwrap(), user_id, message_type).await
            }
        }
    }
}

const BOX_COLUMNS: &str = "m.id, m.sender_id, s.username AS sender_name, s.imgurl AS sender_avatar, \
     m.receiver_id, r.username AS receiver_name, r.imgurl AS receiver_avatar, \
     m.type, m.content, m.is_read, m.created_at";

const BOX_JOINS: &str = "LEFT JOIN users s ON m.sender_id = s.id \
     LEFT JOIN users r ON m.receiver_id = r.id";

/// Inbox WHERE clause. Bind order: user_id, type, is_read.
fn inbox_where(filter: &MessageFilter) -> String {
    let mut clause = String::from("m.receiver_id = ?");
    if filter.message_type.is_some() {
        clause.push_str(" AND m.type = ?");
    }
    if filter.is_read.is_some() {
        clause.push_str(" AND m.is_read = ?");
    }
    clause
}

/// Outbox WHERE clause. Bind order: user_id, type.
fn outbox_where(message_type: Option<MessageType>) -> String {
    let mut clause = String::from("m.sender_id = ?");
    if message_type.is_some() {
        clause.push_str(" AND m.type = ?");
    }
    clause
}

/// `id IN (?, ?, ...)` placeholder list
fn in_placeholders(len: usize) -> String {
    vec!["?"; len].join(", ")
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, input: &SendMessageInput, sender_id: i64) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO message (sender_id, receiver_id, type, content, is_read, created_at) \
         VALUES (?, ?, ?, ?, 0, ?)",
    )
    .bind(sender_id)
    .bind(input.receiver_id)
    .bind(input.message_type.as_str())
    .bind(&input.content)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to create message")?;

    Ok(result.last_insert_rowid())
}

async fn inbox_page_sqlite(
    pool: &SqlitePool,
    params: &ListParams,
    filter: &MessageFilter,
    user_id: i64,
) -> Result<PagedResult<MessageWithUsers>> {
    let where_clause = inbox_where(filter);

    let list_sql = format!(
        "SELECT {} FROM message m {} WHERE {} ORDER BY m.created_at DESC LIMIT ? OFFSET ?",
        BOX_COLUMNS, BOX_JOINS, where_clause
    );
    let mut query = sqlx::query(&list_sql).bind(user_id);
    if let Some(t) = filter.message_type {
        query = query.bind(t.as_str());
    }
    if let Some(is_read) = filter.is_read {
        query = query.bind(is_read as i64);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list inbox")?;

    let mut list = Vec::with_capacity(rows.len());
    for row in &rows {
        list.push(row_to_message_sqlite(row)?);
    }

    let total_sql = format!("SELECT COUNT(*) AS total FROM message m WHERE {}", where_clause);
    let mut query = sqlx::query(&total_sql).bind(user_id);
    if let Some(t) = filter.message_type {
        query = query.bind(t.as_str());
    }
    if let Some(is_read) = filter.is_read {
        query = query.bind(is_read as i64);
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count inbox")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn outbox_page_sqlite(
    pool: &SqlitePool,
    params: &ListParams,
    message_type: Option<MessageType>,
    user_id: i64,
) -> Result<PagedResult<MessageWithUsers>> {
    let where_clause = outbox_where(message_type);

    let list_sql = format!(
        "SELECT {} FROM message m {} WHERE {} ORDER BY m.created_at DESC LIMIT ? OFFSET ?",
        BOX_COLUMNS, BOX_JOINS, where_clause
    );
    let mut query = sqlx::query(&list_sql).bind(user_id);
    if let Some(t) = message_type {
        query = query.bind(t.as_str());
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list outbox")?;

    let mut list = Vec::with_capacity(rows.len());
    for row in &rows {
        list.push(row_to_message_sqlite(row)?);
    }

    let total_sql = format!("SELECT COUNT(*) AS total FROM message m WHERE {}", where_clause);
    let mut query = sqlx::query(&total_sql).bind(user_id);
    if let Some(t) = message_type {
        query = query.bind(t.as_str());
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count outbox")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn mark_read_sqlite(pool: &SqlitePool, ids: &[i64], user_id: i64) -> Result<u64> {
    let sql = format!(
        "UPDATE message SET is_read = 1 WHERE receiver_id = ? AND is_read = 0 AND id IN ({})",
        in_placeholders(ids.len())
    );
    let mut query = sqlx::query(&sql).bind(user_id);
    for id in ids {
        query = query.bind(id);
    }

    let result = query
        .execute(pool)
        .await
        .context("Failed to mark messages read")?;
    Ok(result.rows_affected())
}

async fn delete_sqlite(pool: &SqlitePool, id: i64, user_id: i64) -> Result<u64> {
    let result =
        sqlx::query("DELETE FROM message WHERE id = ? AND (sender_id = ? OR receiver_id = ?)")
            .bind(id)
            .bind(user_id)
            .bind(user_id)
            .execute(pool)
            .await
            .context("Failed to delete message")?;
    Ok(result.rows_affected())
}

async fn unread_count_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    message_type: Option<MessageType>,
) -> Result<i64> {
    let mut sql = String::from(
        "SELECT COUNT(*) AS count FROM message WHERE receiver_id = ? AND is_read = 0",
    );
    if message_type.is_some() {
        sql.push_str(" AND type = ?");
    }
    let mut query = sqlx::query(&sql).bind(user_id);
    if let Some(t) = message_type {
        query = query.bind(t.as_str());
    }

    let row = query
        .fetch_one(pool)
        .await
        .context("Failed to count unread messages")?;
    Ok(row.get("count"))
}

fn row_to_message_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<MessageWithUsers> {
    let type_str: String = row.get("type");
    let message_type = MessageType::from_str(&type_str)
        .with_context(|| format!("Invalid message type in database: {}", type_str))?;
    let is_read: i64 = row.get("is_read");

    Ok(MessageWithUsers {
        id: row.get("id"),
        sender_id: row.get("sender_id"),
        sender_name: row.get("sender_name"),
        sender_avatar: row.get("sender_avatar"),
        receiver_id: row.get("receiver_id"),
        receiver_name: row.get("receiver_name"),
        receiver_avatar: row.get("receiver_avatar"),
        message_type,
        content: row.get("content"),
        is_read: is_read != 0,
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &SendMessageInput, sender_id: i64) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO message (sender_id, receiver_id, type, content, is_read, created_at) \
         VALUES (?, ?, ?, ?, 0, ?)",
    )
    .bind(sender_id)
    .bind(input.receiver_id)
    .bind(input.message_type.as_str())
    .bind(&input.content)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to create message")?;

    Ok(result.last_insert_id() as i64)
}

async fn inbox_page_mysql(
    pool: &MySqlPool,
    params: &ListParams,
    filter: &MessageFilter,
    user_id: i64,
) -> Result<PagedResult<MessageWithUsers>> {
    let where_clause = inbox_where(filter);

    let list_sql = format!(
        "SELECT {} FROM message m {} WHERE {} ORDER BY m.created_at DESC LIMIT ? OFFSET ?",
        BOX_COLUMNS, BOX_JOINS, where_clause
    );
    let mut query = sqlx::query(&list_sql).bind(user_id);
    if let Some(t) = filter.message_type {
        query = query.bind(t.as_str());
    }
    if let Some(is_read) = filter.is_read {
        query = query.bind(is_read as i64);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list inbox")?;

    let mut list = Vec::with_capacity(rows.len());
    for row in &rows {
        list.push(row_to_message_mysql(row)?);
    }

    let total_sql = format!("SELECT COUNT(*) AS total FROM message m WHERE {}", where_clause);
    let mut query = sqlx::query(&total_sql).bind(user_id);
    if let Some(t) = filter.message_type {
        query = query.bind(t.as_str());
    }
    if let Some(is_read) = filter.is_read {
        query = query.bind(is_read as i64);
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count inbox")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn outbox_page_mysql(
    pool: &MySqlPool,
    params: &ListParams,
    message_type: Option<MessageType>,
    user_id: i64,
) -> Result<PagedResult<MessageWithUsers>> {
    let where_clause = outbox_where(message_type);

    let list_sql = format!(
        "SELECT {} FROM message m {} WHERE {} ORDER BY m.created_at DESC LIMIT ? OFFSET ?",
        BOX_COLUMNS, BOX_JOINS, where_clause
    );
    let mut query = sqlx::query(&list_sql).bind(user_id);
    if let Some(t) = message_type {
        query = query.bind(t.as_str());
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list outbox")?;

    let mut list = Vec::with_capacity(rows.len());
    for row in &rows {
        list.push(row_to_message_mysql(row)?);
    }

    let total_sql = format!("SELECT COUNT(*) AS total FROM message m WHERE {}", where_clause);
    let mut query = sqlx::query(&total_sql).bind(user_id);
    if let Some(t) = message_type {
        query = query.bind(t.as_str());
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count outbox")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn mark_read_mysql(pool: &MySqlPool, ids: &[i64], user_id: i64) -> Result<u64> {
    let sql = format!(
        "UPDATE message SET is_read = 1 WHERE receiver_id = ? AND is_read = 0 AND id IN ({})",
        in_placeholders(ids.len())
    );
    let mut query = sqlx::query(&sql).bind(user_id);
    for id in ids {
        query = query.bind(id);
    }

    let result = query
        .execute(pool)
        .await
        .context("Failed to mark messages read")?;
    Ok(result.rows_affected())
}

async fn delete_mysql(pool: &MySqlPool, id: i64, user_id: i64) -> Result<u64> {
    let result =
        sqlx::query("DELETE FROM message WHERE id = ? AND (sender_id = ? OR receiver_id = ?)")
            .bind(id)
            .bind(user_id)
            .bind(user_id)
            .execute(pool)
            .await
            .context("Failed to delete message")?;
    Ok(result.rows_affected())
}

async fn unread_count_mysql(
    pool: &MySqlPool,
    user_id: i64,
    message_type: Option<MessageType>,
) -> Result<i64> {
    let mut sql = String::from(
        "SELECT COUNT(*) AS count FROM message WHERE receiver_id = ? AND is_read = 0",
    );
    if message_type.is_some() {
        sql.push_str(" AND type = ?");
    }
    let mut query = sqlx::query(&sql).bind(user_id);
    if let Some(t) = message_type {
        query = query.bind(t.as_str());
    }

    let row = query
        .fetch_one(pool)
        .await
        .context("Failed to count unread messages")?;
    Ok(row.get("count"))
}

fn row_to_message_mysql(row: &sqlx::mysql::MySqlRow) -> Result<MessageWithUsers> {
    let type_str: String = row.get("type");
    let message_type = MessageType::from_str(&type_str)
        .with_context(|| format!("Invalid message type in database: {}", type_str))?;
    let is_read: i64 = row.get("is_read");

    Ok(MessageWithUsers {
        id: row.get("id"),
        sender_id: row.get("sender_id"),
        sender_name: row.get("sender_name"),
        sender_avatar: row.get("sender_avatar"),
        receiver_id: row.get("receiver_id"),
        receiver_name: row.get("receiver_name"),
        receiver_avatar: row.get("receiver_avatar"),
        message_type,
        content: row.get("content"),
        is_read: is_read != 0,
        created_at: row.get("created_at"),
    })
}
