//! Comment repository
//!
//! Comments are soft-deleted (status 0) and listed newest first, joined
//! with the commenter's name and the article title.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentWithMeta, CreateCommentInput, ListParams, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment, returning its id
    async fn create(&self, input: &CreateCommentInput, user_id: i64) -> Result<i64>;

    /// Fetch a comment by id (active rows only)
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Page through all active comments, newest first
    async fn list_page(&self, params: &ListParams) -> Result<PagedResult<CommentWithMeta>>;

    /// Page through one user's active comments
    async fn list_by_user(
        &self,
        params: &ListParams,
        user_id: i64,
    ) -> Result<PagedResult<CommentWithMeta>>;

    /// Logical delete. `owner_scope` restricts to the caller's own rows;
    /// admins pass `None`. Returns affected row count.
    async fn soft_delete(&self, id: i64, owner_scope: Option<i64>) -> Result<u64>;
}

/// SQLx-based comment repository supporting both SQLite and MySQL.
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn shared(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput, user_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), input, user_id).await
            }
            DatabaseDriver::Mysql => {
                create_mysql(self.pool.as_mysql().unwrap(), input, user_id).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_page(&self, params: &ListParams) -> Result<PagedResult<CommentWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_page_sqlite(self.pool.as_sqlite().unwrap(), params, None).await
            }
            DatabaseDriver::Mysql => {
                list_page_mysql(self.pool.as_mysql().unwrap(), params, None).await
            }
        }
    }

    async fn list_by_user(
        &self,
        params: &ListParams,
        user_id: i64,
    ) -> Result<PagedResult<CommentWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_page_sqlite(self.pool.as_sqlite().unwrap(), params, Some(user_id)).await
            }
            DatabaseDriver::Mysql => {
                list_page_mysql(self.pool.as_mysql().unwrap(), params, Some(user_id)).await
            }
        }
    }

    async fn soft_delete(&self, id: i64, owner_scope: Option<i64>) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                soft_delete_sqlite(self.pool.as_sqlite().unwrap(), id, owner_scope).await
            }
            DatabaseDriver::Mysql => {
                soft_delete_mysql(self.pool.as_mysql().unwrap(), id, owner_scope).await
            }
        }
    }
}

const META_COLUMNS: &str = "c.id, c.user_id, u.username AS user_name, c.article_id, \
     a.title AS article_title, c.parent_id, c.content, c.complaint, c.is_read, c.created_at";

fn list_where(user_scope: Option<i64>) -> &'static str {
    if user_scope.is_some() {
        "c.status = 1 AND c.user_id = ?"
    } else {
        "c.status = 1"
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, input: &CreateCommentInput, user_id: i64) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO comment (user_id, article_id, parent_id, content, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(input.article_id)
    .bind(input.parent_id)
    .bind(&input.content)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(result.last_insert_rowid())
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, user_id, article_id, parent_id, content, complaint, is_read, created_at \
         FROM comment WHERE id = ? AND status = 1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment")?;

    Ok(row.map(|row| row_to_comment_sqlite(&row)))
}

async fn list_page_sqlite(
    pool: &SqlitePool,
    params: &ListParams,
    user_scope: Option<i64>,
) -> Result<PagedResult<CommentWithMeta>> {
    let where_clause = list_where(user_scope);

    let list_sql = format!(
        "SELECT {} FROM comment c \
         LEFT JOIN users u ON c.user_id = u.id \
         LEFT JOIN article a ON c.article_id = a.id \
         WHERE {} ORDER BY c.created_at DESC LIMIT ? OFFSET ?",
        META_COLUMNS, where_clause
    );
    let mut query = sqlx::query(&list_sql);
    if let Some(user_id) = user_scope {
        query = query.bind(user_id);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    let list = rows.iter().map(row_to_meta_sqlite).collect();

    let total_sql = format!("SELECT COUNT(*) AS total FROM comment c WHERE {}", where_clause);
    let mut query = sqlx::query(&total_sql);
    if let Some(user_id) = user_scope {
        query = query.bind(user_id);
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn soft_delete_sqlite(pool: &SqlitePool, id: i64, owner_scope: Option<i64>) -> Result<u64> {
    let sql = if owner_scope.is_some() {
        "UPDATE comment SET status = 0 WHERE id = ? AND user_id = ? AND status = 1"
    } else {
        "UPDATE comment SET status = 0 WHERE id = ? AND status = 1"
    };
    let mut query = sqlx::query(sql).bind(id);
    if let Some(user_id) = owner_scope {
        query = query.bind(user_id);
    }

    let result = query.execute(pool).await.context("Failed to delete comment")?;
    Ok(result.rows_affected())
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Comment {
    let is_read: i64 = row.get("is_read");
    Comment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        article_id: row.get("article_id"),
        parent_id: row.get("parent_id"),
        content: row.get("content"),
        complaint: row.get("complaint"),
        is_read: is_read != 0,
        created_at: row.get("created_at"),
    }
}

fn row_to_meta_sqlite(row: &sqlx::sqlite::SqliteRow) -> CommentWithMeta {
    let is_read: i64 = row.get("is_read");
    CommentWithMeta {
        id: row.get("id"),
        user_id: row.get("user_id"),
        user_name: row.get("user_name"),
        article_id: row.get("article_id"),
        article_title: row.get("article_title"),
        parent_id: row.get("parent_id"),
        content: row.get("content"),
        complaint: row.get("complaint"),
        is_read: is_read != 0,
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &CreateCommentInput, user_id: i64) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO comment (user_id, article_id, parent_id, content, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(input.article_id)
    .bind(input.parent_id)
    .bind(&input.content)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(result.last_insert_id() as i64)
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, user_id, article_id, parent_id, content, complaint, is_read, created_at \
         FROM comment WHERE id = ? AND status = 1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment")?;

    Ok(row.map(|row| row_to_comment_mysql(&row)))
}

async fn list_page_mysql(
    pool: &MySqlPool,
    params: &ListParams,
    user_scope: Option<i64>,
) -> Result<PagedResult<CommentWithMeta>> {
    let where_clause = list_where(user_scope);

    let list_sql = format!(
        "SELECT {} FROM comment c \
         LEFT JOIN users u ON c.user_id = u.id \
         LEFT JOIN article a ON c.article_id = a.id \
         WHERE {} ORDER BY c.created_at DESC LIMIT ? OFFSET ?",
        META_COLUMNS, where_clause
    );
    let mut query = sqlx::query(&list_sql);
    if let Some(user_id) = user_scope {
        query = query.bind(user_id);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    let list = rows.iter().map(row_to_meta_mysql).collect();

    let total_sql = format!("SELECT COUNT(*) AS total FROM comment c WHERE {}", where_clause);
    let mut query = sqlx::query(&total_sql);
    if let Some(user_id) = user_scope {
        query = query.bind(user_id);
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn soft_delete_mysql(pool: &MySqlPool, id: i64, owner_scope: Option<i64>) -> Result<u64> {
    let sql = if owner_scope.is_some() {
        "UPDATE comment SET status = 0 WHERE id = ? AND user_id = ? AND status = 1"
    } else {
        "UPDATE comment SET status = 0 WHERE id = ? AND status = 1"
    };
    let mut query = sqlx::query(sql).bind(id);
    if let Some(user_id) = owner_scope {
        query = query.bind(user_id);
    }

    let result = query.execute(pool).await.context("Failed to delete comment")?;
    Ok(result.rows_affected())
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Comment {
    let is_read: i64 = row.get("is_read");
    Comment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        article_id: row.get("article_id"),
        parent_id: row.get("parent_id"),
        content: row.get("content"),
        complaint: row.get("complaint"),
        is_read: is_read != 0,
        created_at: row.get("created_at"),
    }
}

fn row_to_meta_mysql(row: &sqlx::mysql::MySqlRow) -> CommentWithMeta {
    let is_read: i64 = row.get("is_read");
    CommentWithMeta {
        id: row.get("id"),
        user_id: row.get("user_id"),
        user_name: row.get("user_name"),
        article_id: row.get("article_id"),
        article_title: row.get("article_title"),
        parent_id: row.get("parent_id"),
        content: row.get("content"),
        complaint: row.get("complaint"),
        is_read: is_read != 0,
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        ArticleRepository, SqlxArticleRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Classify, CreateArticleInput, User, UserRole};

    async fn setup() -> (SqlxCommentRepository, i64, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let user = users
            .create(&User::new(
                "commenter".to_string(),
                "commenter@linlog.com".to_string(),
                "hash".to_string(),
                UserRole::Normal,
                None,
            ))
            .await
            .unwrap();

        let articles = SqlxArticleRepository::new(pool.clone());
        let article_id = articles
            .create(
                &CreateArticleInput {
                    title: "被评论的文章".to_string(),
                    content: "内容".to_string(),
                    classify: Classify::Article,
                    subset_id: None,
                    label: String::new(),
                    introduce: String::new(),
                    cover: String::new(),
                },
                user.id,
            )
            .await
            .unwrap();

        (SqlxCommentRepository::new(pool), user.id, article_id)
    }

    fn comment_input(article_id: i64, content: &str) -> CreateCommentInput {
        CreateCommentInput {
            article_id,
            content: content.to_string(),
            parent_id: 0,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_with_meta() {
        let (repo, user_id, article_id) = setup().await;

        repo.create(&comment_input(article_id, "写得不错"), user_id)
            .await
            .unwrap();

        let page = repo.list_page(&ListParams::default()).await.unwrap();
        assert_eq!(page.total, 1);
        let meta = &page.list[0];
        assert_eq!(meta.user_name.as_deref(), Some("commenter"));
        assert_eq!(meta.article_title.as_deref(), Some("被评论的文章"));
        assert_eq!(meta.content, "写得不错");
        assert!(!meta.is_read);
    }

    #[tokio::test]
    async fn test_reply_keeps_parent_id() {
        let (repo, user_id, article_id) = setup().await;

        let parent = repo
            .create(&comment_input(article_id, "楼主"), user_id)
            .await
            .unwrap();
        let reply = CreateCommentInput {
            article_id,
            content: "回复楼主".to_string(),
            parent_id: parent,
        };
        repo.create(&reply, user_id).await.unwrap();

        let page = repo.list_page(&ListParams::default()).await.unwrap();
        let reply_meta = page
            .list
            .iter()
            .find(|c| c.content == "回复楼主")
            .expect("Reply missing");
        assert_eq!(reply_meta.parent_id, parent);
    }

    #[tokio::test]
    async fn test_soft_delete_owner_scope() {
        let (repo, user_id, article_id) = setup().await;
        let id = repo
            .create(&comment_input(article_id, "目标"), user_id)
            .await
            .unwrap();

        // Wrong owner matches nothing
        assert_eq!(repo.soft_delete(id, Some(user_id + 1)).await.unwrap(), 0);
        // Right owner deletes
        assert_eq!(repo.soft_delete(id, Some(user_id)).await.unwrap(), 1);
        // Already deleted
        assert_eq!(repo.soft_delete(id, None).await.unwrap(), 0);

        let page = repo.list_page(&ListParams::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_list_by_user() {
        let (repo, user_id, article_id) = setup().await;
        repo.create(&comment_input(article_id, "我的评论"), user_id)
            .await
            .unwrap();

        let mine = repo
            .list_by_user(&ListParams::default(), user_id)
            .await
            .unwrap();
        assert_eq!(mine.total, 1);

        let none = repo
            .list_by_user(&ListParams::default(), user_id + 1)
            .await
            .unwrap();
        assert_eq!(none.total, 0);
    }
}
