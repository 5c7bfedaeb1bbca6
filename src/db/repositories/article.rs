//! Article repository
//!
//! Data access for articles and image collections: filtered pagination
//! with role scoping, partial updates, lifecycle transitions, logical
//! deletion and praise (like) toggling.
//!
//! The WHERE clause is assembled condition by condition and the values are
//! bound in exactly the same order, so every query stays parameterized.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{
    Article, ArticleFilter, ArticleState, ArticleWithSubset, Classify, CreateArticleInput,
    ListParams, PagedResult, UpdateArticleInput,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Article repository trait
///
/// `owner_scope` carries `Some(user_id)` when the caller may only touch
/// their own rows (normal/visitor accounts); staff pass `None`.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert a new draft article, returning its id
    async fn create(&self, input: &CreateArticleInput, user_id: i64) -> Result<i64>;

    /// Page through articles with optional filters, excluding deleted rows
    async fn list_page(
        &self,
        params: &ListParams,
        filter: &ArticleFilter,
        owner_scope: Option<i64>,
    ) -> Result<PagedResult<ArticleWithSubset>>;

    /// Fetch one article; owner-scoped callers see their own or published rows
    async fn get_by_id(&self, id: i64, owner_scope: Option<i64>) -> Result<Option<ArticleWithSubset>>;

    /// Partial update; returns affected row count (0 = missing or no permission)
    async fn update(
        &self,
        id: i64,
        input: &UpdateArticleInput,
        owner_scope: Option<i64>,
    ) -> Result<u64>;

    /// Lifecycle transition; returns affected row count
    async fn update_state(
        &self,
        id: i64,
        state: ArticleState,
        owner_scope: Option<i64>,
    ) -> Result<u64>;

    /// Logical delete (state := deleted); returns affected row count
    async fn soft_delete(&self, id: i64, owner_scope: Option<i64>) -> Result<u64>;

    /// Toggle the caller's like; returns true when the article is now liked
    async fn toggle_praise(&self, article_id: i64, user_id: i64) -> Result<bool>;

    /// Adjust the denormalized comment counter
    async fn adjust_comment_count(&self, article_id: i64, delta: i64) -> Result<()>;
}

/// SQLx-based article repository supporting both SQLite and MySQL.
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn shared(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, input: &CreateArticleInput, user_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), input, user_id).await
            }
            DatabaseDriver::Mysql => {
                create_mysql(self.pool.as_mysql().unwrap(), input, user_id).await
            }
        }
    }

    async fn list_page(
        &self,
        params: &ListParams,
        filter: &ArticleFilter,
        owner_scope: Option<i64>,
    ) -> Result<PagedResult<ArticleWithSubset>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_page_sqlite(self.pool.as_sqlite().unwrap(), params, filter, owner_scope).await
            }
            DatabaseDriver::Mysql => {
                list_page_mysql(self.pool.as_mysql().unwrap(), params, filter, owner_scope).await
            }
        }
    }

    async fn get_by_id(
        &self,
        id: i64,
        owner_scope: Option<i64>,
    ) -> Result<Option<ArticleWithSubset>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id, owner_scope).await
            }
            DatabaseDriver::Mysql => {
                get_by_id_mysql(self.pool.as_mysql().unwrap(), id, owner_scope).await
            }
        }
    }

    async fn update(
        &self,
        id: i64,
        input: &UpdateArticleInput,
        owner_scope: Option<i64>,
    ) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_sqlite(self.pool.as_sqlite().unwrap(), id, input, owner_scope).await
            }
            DatabaseDriver::Mysql => {
                update_mysql(self.pool.as_mysql().unwrap(), id, input, owner_scope).await
            }
        }
    }

    async fn update_state(
        &self,
        id: i64,
        state: ArticleState,
        owner_scope: Option<i64>,
    ) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_state_sqlite(self.pool.as_sqlite().unwrap(), id, state, owner_scope).await
            }
            DatabaseDriver::Mysql => {
                update_state_mysql(self.pool.as_mysql().unwrap(), id, state, owner_scope).await
            }
        }
    }

    async fn soft_delete(&self, id: i64, owner_scope: Option<i64>) -> Result<u64> {
        // Logical delete is a state transition into the terminal state
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                soft_delete_sqlite(self.pool.as_sqlite().unwrap(), id, owner_scope).await
            }
            DatabaseDriver::Mysql => {
                soft_delete_mysql(self.pool.as_mysql().unwrap(), id, owner_scope).await
            }
        }
    }

    async fn toggle_praise(&self, article_id: i64, user_id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                toggle_praise_sqlite(self.pool.as_sqlite().unwrap(), article_id, user_id).await
            }
            DatabaseDriver::Mysql => {
                toggle_praise_mysql(self.pool.as_mysql().unwrap(), article_id, user_id).await
            }
        }
    }

    async fn adjust_comment_count(&self, article_id: i64, delta: i64) -> Result<()> {
        let sql = "UPDATE article SET comments = comments + ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(sql)
                    .bind(delta)
                    .bind(article_id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await
                    .context("Failed to adjust comment count")?;
            }
            DatabaseDriver::Mysql => {
                sqlx::query(sql)
                    .bind(delta)
                    .bind(article_id)
                    .execute(self.pool.as_mysql().unwrap())
                    .await
                    .context("Failed to adjust comment count")?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Shared SQL assembly
// ============================================================================

const LIST_COLUMNS: &str = "a.id, a.title, a.subset_id, s.subset_name, a.classify, a.label, \
     a.introduce, a.cover, a.user_id, a.views, a.likes, a.comments, a.state, \
     a.created_at, a.updated_at, a.published_at";

/// WHERE clause for the list query. Bind order must follow the push order:
/// deleted marker, owner id, state, classify, subset id.
fn list_where(filter: &ArticleFilter, owner_scope: Option<i64>) -> String {
    let mut clause = String::from("a.state != ?");
    if owner_scope.is_some() {
        clause.push_str(" AND a.user_id = ?");
    }
    if filter.state.is_some() {
        clause.push_str(" AND a.state = ?");
    }
    if filter.classify.is_some() {
        clause.push_str(" AND a.classify = ?");
    }
    if filter.subset_id.is_some() {
        clause.push_str(" AND a.subset_id = ?");
    }
    clause
}

/// SET clause for a partial update. Bind order: title, content, classify,
/// subset_id, label, introduce, cover, state, then updated_at/published_at.
fn update_set(input: &UpdateArticleInput) -> String {
    let mut fields = Vec::new();
    if input.title.is_some() {
        fields.push("title = ?");
    }
    if input.content.is_some() {
        fields.push("content = ?");
    }
    if input.classify.is_some() {
        fields.push("classify = ?");
    }
    if input.subset_id.is_some() {
        fields.push("subset_id = ?");
    }
    if input.label.is_some() {
        fields.push("label = ?");
    }
    if input.introduce.is_some() {
        fields.push("introduce = ?");
    }
    if input.cover.is_some() {
        fields.push("cover = ?");
    }
    if input.state.is_some() {
        fields.push("state = ?");
    }
    fields.push("updated_at = ?");
    // Publishing stamps the publication time, rejection clears it
    match input.state {
        Some(ArticleState::Published) => fields.push("published_at = ?"),
        Some(ArticleState::Rejected) => fields.push("published_at = NULL"),
        _ => {}
    }
    fields.join(", ")
}

fn update_where(owner_scope: Option<i64>) -> &'static str {
    if owner_scope.is_some() {
        "id = ? AND state != ? AND user_id = ?"
    } else {
        "id = ? AND state != ?"
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, input: &CreateArticleInput, user_id: i64) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO article (title, subset_id, classify, label, introduce, content, cover,
                             user_id, state, created_at, updated_at, published_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'draft', ?, ?, NULL)
        "#,
    )
    .bind(&input.title)
    .bind(input.subset_id)
    .bind(input.classify.as_str())
    .bind(&input.label)
    .bind(&input.introduce)
    .bind(&input.content)
    .bind(&input.cover)
    .bind(user_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create article")?;

    Ok(result.last_insert_rowid())
}

async fn list_page_sqlite(
    pool: &SqlitePool,
    params: &ListParams,
    filter: &ArticleFilter,
    owner_scope: Option<i64>,
) -> Result<PagedResult<ArticleWithSubset>> {
    let where_clause = list_where(filter, owner_scope);

    let list_sql = format!(
        "SELECT {} FROM article a LEFT JOIN subset s ON a.subset_id = s.id \
         WHERE {} ORDER BY a.created_at DESC LIMIT ? OFFSET ?",
        LIST_COLUMNS, where_clause
    );
    let mut query = sqlx::query(&list_sql).bind(ArticleState::Deleted.as_str());
    if let Some(user_id) = owner_scope {
        query = query.bind(user_id);
    }
    if let Some(state) = filter.state {
        query = query.bind(state.as_str());
    }
    if let Some(classify) = filter.classify {
        query = query.bind(classify.as_str());
    }
    if let Some(subset_id) = filter.subset_id {
        query = query.bind(subset_id);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list articles")?;

    let mut list = Vec::with_capacity(rows.len());
    for row in &rows {
        list.push(row_to_article_sqlite(row)?);
    }

    let total_sql = format!(
        "SELECT COUNT(*) AS total FROM article a WHERE {}",
        where_clause
    );
    let mut query = sqlx::query(&total_sql).bind(ArticleState::Deleted.as_str());
    if let Some(user_id) = owner_scope {
        query = query.bind(user_id);
    }
    if let Some(state) = filter.state {
        query = query.bind(state.as_str());
    }
    if let Some(classify) = filter.classify {
        query = query.bind(classify.as_str());
    }
    if let Some(subset_id) = filter.subset_id {
        query = query.bind(subset_id);
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count articles")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn get_by_id_sqlite(
    pool: &SqlitePool,
    id: i64,
    owner_scope: Option<i64>,
) -> Result<Option<ArticleWithSubset>> {
    let mut where_clause = String::from("a.id = ? AND a.state != ?");
    if owner_scope.is_some() {
        // Owner-scoped callers may read their own rows or anything published
        where_clause.push_str(" AND (a.user_id = ? OR a.state = ?)");
    }

    let sql = format!(
        "SELECT {}, a.content FROM article a LEFT JOIN subset s ON a.subset_id = s.id WHERE {}",
        LIST_COLUMNS, where_clause
    );
    let mut query = sqlx::query(&sql)
        .bind(id)
        .bind(ArticleState::Deleted.as_str());
    if let Some(user_id) = owner_scope {
        query = query
            .bind(user_id)
            .bind(ArticleState::Published.as_str());
    }

    let row = query
        .fetch_optional(pool)
        .await
        .context("Failed to get article by ID")?;

    row.map(|row| row_to_article_sqlite(&row)).transpose()
}

async fn update_sqlite(
    pool: &SqlitePool,
    id: i64,
    input: &UpdateArticleInput,
    owner_scope: Option<i64>,
) -> Result<u64> {
    if !input.has_changes() {
        return Ok(0);
    }

    let now = Utc::now();
    let sql = format!(
        "UPDATE article SET {} WHERE {}",
        update_set(input),
        update_where(owner_scope)
    );

    let mut query = sqlx::query(&sql);
    if let Some(title) = &input.title {
        query = query.bind(title);
    }
    if let Some(content) = &input.content {
        query = query.bind(content);
    }
    if let Some(classify) = input.classify {
        query = query.bind(classify.as_str());
    }
    if let Some(subset_id) = input.subset_id {
        query = query.bind(subset_id);
    }
    if let Some(label) = &input.label {
        query = query.bind(label);
    }
    if let Some(introduce) = &input.introduce {
        query = query.bind(introduce);
    }
    if let Some(cover) = &input.cover {
        query = query.bind(cover);
    }
    if let Some(state) = input.state {
        query = query.bind(state.as_str());
    }
    query = query.bind(now);
    if input.state == Some(ArticleState::Published) {
        query = query.bind(now);
    }
    query = query.bind(id).bind(ArticleState::Deleted.as_str());
    if let Some(user_id) = owner_scope {
        query = query.bind(user_id);
    }

    let result = query.execute(pool).await.context("Failed to update article")?;
    Ok(result.rows_affected())
}

async fn update_state_sqlite(
    pool: &SqlitePool,
    id: i64,
    state: ArticleState,
    owner_scope: Option<i64>,
) -> Result<u64> {
    let input = UpdateArticleInput {
        state: Some(state),
        ..Default::default()
    };
    update_sqlite(pool, id, &input, owner_scope).await
}

async fn soft_delete_sqlite(pool: &SqlitePool, id: i64, owner_scope: Option<i64>) -> Result<u64> {
    let sql = format!(
        "UPDATE article SET state = ?, updated_at = ? WHERE {}",
        update_where(owner_scope)
    );
    let mut query = sqlx::query(&sql)
        .bind(ArticleState::Deleted.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(ArticleState::Deleted.as_str());
    if let Some(user_id) = owner_scope {
        query = query.bind(user_id);
    }

    let result = query.execute(pool).await.context("Failed to delete article")?;
    Ok(result.rows_affected())
}

async fn toggle_praise_sqlite(pool: &SqlitePool, article_id: i64, user_id: i64) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let existing = sqlx::query("SELECT id FROM praise WHERE user_id = ? AND article_id = ?")
        .bind(user_id)
        .bind(article_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to check praise")?;

    let liked = if existing.is_some() {
        sqlx::query("DELETE FROM praise WHERE user_id = ? AND article_id = ?")
            .bind(user_id)
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .context("Failed to remove praise")?;
        sqlx::query("UPDATE article SET likes = likes - 1 WHERE id = ? AND likes > 0")
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .context("Failed to decrement likes")?;
        false
    } else {
        sqlx::query("INSERT INTO praise (user_id, article_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .context("Failed to insert praise")?;
        sqlx::query("UPDATE article SET likes = likes + 1 WHERE id = ?")
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .context("Failed to increment likes")?;
        true
    };

    tx.commit().await.context("Failed to commit praise toggle")?;
    Ok(liked)
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<ArticleWithSubset> {
    let state_str: String = row.get("state");
    let state = ArticleState::from_str(&state_str)
        .with_context(|| format!("Invalid article state in database: {}", state_str))?;
    let classify_str: String = row.get("classify");
    let classify = Classify::from_str(&classify_str)
        .with_context(|| format!("Invalid classify in database: {}", classify_str))?;

    Ok(ArticleWithSubset {
        article: Article {
            id: row.get("id"),
            title: row.get("title"),
            subset_id: row.get("subset_id"),
            classify,
            label: row.get("label"),
            introduce: row.get("introduce"),
            // The list query omits the body
            content: row.try_get("content").unwrap_or_default(),
            cover: row.get("cover"),
            user_id: row.get("user_id"),
            views: row.get("views"),
            likes: row.get("likes"),
            comments: row.get("comments"),
            state,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            published_at: row.try_get("published_at").ok(),
        },
        subset_name: row.get("subset_name"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &CreateArticleInput, user_id: i64) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO article (title, subset_id, classify, label, introduce, content, cover,
                             user_id, state, created_at, updated_at, published_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'draft', ?, ?, NULL)
        "#,
    )
    .bind(&input.title)
    .bind(input.subset_id)
    .bind(input.classify.as_str())
    .bind(&input.label)
    .bind(&input.introduce)
    .bind(&input.content)
    .bind(&input.cover)
    .bind(user_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create article")?;

    Ok(result.last_insert_id() as i64)
}

async fn list_page_mysql(
    pool: &MySqlPool,
    params: &ListParams,
    filter: &ArticleFilter,
    owner_scope: Option<i64>,
) -> Result<PagedResult<ArticleWithSubset>> {
    let where_clause = list_where(filter, owner_scope);

    let list_sql = format!(
        "SELECT {} FROM article a LEFT JOIN subset s ON a.subset_id = s.id \
         WHERE {} ORDER BY a.created_at DESC LIMIT ? OFFSET ?",
        LIST_COLUMNS, where_clause
    );
    let mut query = sqlx::query(&list_sql).bind(ArticleState::Deleted.as_str());
    if let Some(user_id) = owner_scope {
        query = query.bind(user_id);
    }
    if let Some(state) = filter.state {
        query = query.bind(state.as_str());
    }
    if let Some(classify) = filter.classify {
        query = query.bind(classify.as_str());
    }
    if let Some(subset_id) = filter.subset_id {
        query = query.bind(subset_id);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list articles")?;

    let mut list = Vec::with_capacity(rows.len());
    for row in &rows {
        list.push(row_to_article_mysql(row)?);
    }

    let total_sql = format!(
        "SELECT COUNT(*) AS total FROM article a WHERE {}",
        where_clause
    );
    let mut query = sqlx::query(&total_sql).bind(ArticleState::Deleted.as_str());
    if let Some(user_id) = owner_scope {
        query = query.bind(user_id);
    }
    if let Some(state) = filter.state {
        query = query.bind(state.as_str());
    }
    if let Some(classify) = filter.classify {
        query = query.bind(classify.as_str());
    }
    if let Some(subset_id) = filter.subset_id {
        query = query.bind(subset_id);
    }
    let total: i64 = query
        .fetch_one(pool)
        .await
        .context("Failed to count articles")?
        .get("total");

    Ok(PagedResult::new(list, total, params))
}

async fn get_by_id_mysql(
    pool: &MySqlPool,
    id: i64,
    owner_scope: Option<i64>,
) -> Result<Option<ArticleWithSubset>> {
    let mut where_clause = String::from("a.id = ? AND a.state != ?");
    if owner_scope.is_some() {
        where_clause.push_str(" AND (a.user_id = ? OR a.state = ?)");
    }

    let sql = format!(
        "SELECT {}, a.content FROM article a LEFT JOIN subset s ON a.subset_id = s.id WHERE {}",
        LIST_COLUMNS, where_clause
    );
    let mut query = sqlx::query(&sql)
        .bind(id)
        .bind(ArticleState::Deleted.as_str());
    if let Some(user_id) = owner_scope {
        query = query
            .bind(user_id)
            .bind(ArticleState::Published.as_str());
    }

    let row = query
        .fetch_optional(pool)
        .await
        .context("Failed to get article by ID")?;

    row.map(|row| row_to_article_mysql(&row)).transpose()
}

async fn update_mysql(
    pool: &MySqlPool,
    id: i64,
    input: &UpdateArticleInput,
    owner_scope: Option<i64>,
) -> Result<u64> {
    if !input.has_changes() {
        return Ok(0);
    }

    let now = Utc::now();
    let sql = format!(
        "UPDATE article SET {} WHERE {}",
        update_set(input),
        update_where(owner_scope)
    );

    let mut query = sqlx::query(&sql);
    if let Some(title) = &input.title {
        query = query.bind(title);
    }
    if let Some(content) = &input.content {
        query = query.bind(content);
    }
    if let Some(classify) = input.classify {
        query = query.bind(classify.as_str());
    }
    if let Some(subset_id) = input.subset_id {
        query = query.bind(subset_id);
    }
    if let Some(label) = &input.label {
        query = query.bind(label);
    }
    if let Some(introduce) = &input.introduce {
        query = query.bind(introduce);
    }
    if let Some(cover) = &input.cover {
        query = query.bind(cover);
    }
    if let Some(state) = input.state {
        query = query.bind(state.as_str());
    }
    query = query.bind(now);
    if input.state == Some(ArticleState::Published) {
        query = query.bind(now);
    }
    query = query.bind(id).bind(ArticleState::Deleted.as_str());
    if let Some(user_id) = owner_scope {
        query = query.bind(user_id);
    }

    let result = query.execute(pool).await.context("Failed to update article")?;
    Ok(result.rows_affected())
}

async fn update_state_mysql(
    pool: &MySqlPool,
    id: i64,
    state: ArticleState,
    owner_scope: Option<i64>,
) -> Result<u64> {
    let input = UpdateArticleInput {
        state: Some(state),
        ..Default::default()
    };
    update_mysql(pool, id, &input, owner_scope).await
}

async fn soft_delete_mysql(pool: &MySqlPool, id: i64, owner_scope: Option<i64>) -> Result<u64> {
    let sql = format!(
        "UPDATE article SET state = ?, updated_at = ? WHERE {}",
        update_where(owner_scope)
    );
    let mut query = sqlx::query(&sql)
        .bind(ArticleState::Deleted.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(ArticleState::Deleted.as_str());
    if let Some(user_id) = owner_scope {
        query = query.bind(user_id);
    }

    let result = query.execute(pool).await.context("Failed to delete article")?;
    Ok(result.rows_affected())
}

async fn toggle_praise_mysql(pool: &MySqlPool, article_id: i64, user_id: i64) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let existing = sqlx::query("SELECT id FROM praise WHERE user_id = ? AND article_id = ?")
        .bind(user_id)
        .bind(article_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to check praise")?;

    let liked = if existing.is_some() {
        sqlx::query("DELETE FROM praise WHERE user_id = ? AND article_id = ?")
            .bind(user_id)
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .context("Failed to remove praise")?;
        sqlx::query("UPDATE article SET likes = likes - 1 WHERE id = ? AND likes > 0")
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .context("Failed to decrement likes")?;
        false
    } else {
        sqlx::query("INSERT INTO praise (user_id, article_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .context("Failed to insert praise")?;
        sqlx::query("UPDATE article SET likes = likes + 1 WHERE id = ?")
            .bind(article_id)
            .execute(&mut *tx)
            .await
            .context("Failed to increment likes")?;
        true
    };

    tx.commit().await.context("Failed to commit praise toggle")?;
    Ok(liked)
}

fn row_to_article_mysql(row: &sqlx::mysql::MySqlRow) -> Result<ArticleWithSubset> {
    let state_str: String = row.get("state");
    let state = ArticleState::from_str(&state_str)
        .with_context(|| format!("Invalid article state in database: {}", state_str))?;
    let classify_str: String = row.get("classify");
    let classify = Classify::from_str(&classify_str)
        .with_context(|| format!("Invalid classify in database: {}", classify_str))?;

    Ok(ArticleWithSubset {
        article: Article {
            id: row.get("id"),
            title: row.get("title"),
            subset_id: row.get("subset_id"),
            classify,
            label: row.get("label"),
            introduce: row.get("introduce"),
            content: row.try_get("content").unwrap_or_default(),
            cover: row.get("cover"),
            user_id: row.get("user_id"),
            views: row.get("views"),
            likes: row.get("likes"),
            comments: row.get("comments"),
            state,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            published_at: row.try_get("published_at").ok(),
        },
        subset_name: row.get("subset_name"),
    })
}
