//! User repository
//!
//! Database operations for user accounts:
//! - `UserRepository` trait defining the data-access interface
//! - `SqlxUserRepository` implementing it for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{User, UserRole, UserStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by mail address
    async fn get_by_mail(&self, mail: &str) -> Result<Option<User>>;

    /// Record a successful login
    async fn touch_last_login(&self, id: i64) -> Result<()>;

    /// Count total users
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository supporting both SQLite and MySQL.
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn shared(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_user_sqlite(self.pool.as_sqlite().unwrap(), user).await,
            DatabaseDriver::Mysql => create_user_mysql(self.pool.as_mysql().unwrap(), user).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_username_sqlite(self.pool.as_sqlite().unwrap(), username).await
            }
            DatabaseDriver::Mysql => {
                get_by_username_mysql(self.pool.as_mysql().unwrap(), username).await
            }
        }
    }

    async fn get_by_mail(&self, mail: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_mail_sqlite(self.pool.as_sqlite().unwrap(), mail).await,
            DatabaseDriver::Mysql => get_by_mail_mysql(self.pool.as_mysql().unwrap(), mail).await,
        }
    }

    async fn touch_last_login(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                touch_last_login_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => touch_last_login_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_users_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_users_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

const USER_COLUMNS: &str =
    "id, username, mail, password, user_type, imgurl, status, created_at, updated_at, last_login_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, mail, password, user_type, imgurl, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.mail)
    .bind(&user.password_hash)
    .bind(user.user_type.to_string())
    .bind(&user.imgurl)
    .bind(user.status.as_i64())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    let mut created = user.clone();
    created.id = result.last_insert_rowid();
    created.created_at = now;
    created.updated_at = now;
    Ok(created)
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.map(|row| row_to_user_sqlite(&row)).transpose()
}

async fn get_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE username = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by username")?;

    row.map(|row| row_to_user_sqlite(&row)).transpose()
}

async fn get_by_mail_sqlite(pool: &SqlitePool, mail: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE mail = ?", USER_COLUMNS))
        .bind(mail)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by mail")?;

    row.map(|row| row_to_user_sqlite(&row)).transpose()
}

async fn touch_last_login_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("UPDATE users SET last_login_at = ?, updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update last login")?;
    Ok(())
}

async fn count_users_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;
    Ok(row.get("count"))
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("user_type");
    let user_type = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid user role in database: {}", role_str))?;
    let status: i64 = row.get("status");

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        mail: row.get("mail"),
        password_hash: row.get("password"),
        user_type,
        imgurl: row.get("imgurl"),
        status: UserStatus::from_i64(status),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        last_login_at: row.try_get("last_login_at").ok(),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, mail, password, user_type, imgurl, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.mail)
    .bind(&user.password_hash)
    .bind(user.user_type.to_string())
    .bind(&user.imgurl)
    .bind(user.status.as_i64())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    let mut created = user.clone();
    created.id = result.last_insert_id() as i64;
    created.created_at = now;
    created.updated_at = now;
    Ok(created)
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.map(|row| row_to_user_mysql(&row)).transpose()
}

async fn get_by_username_mysql(pool: &MySqlPool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE username = ?",
        USER_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by username")?;

    row.map(|row| row_to_user_mysql(&row)).transpose()
}

async fn get_by_mail_mysql(pool: &MySqlPool, mail: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE mail = ?", USER_COLUMNS))
        .bind(mail)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by mail")?;

    row.map(|row| row_to_user_mysql(&row)).transpose()
}

async fn touch_last_login_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("UPDATE users SET last_login_at = ?, updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update last login")?;
    Ok(())
}

async fn count_users_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;
    Ok(row.get("count"))
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    let role_str: String = row.get("user_type");
    let user_type = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid user role in database: {}", role_str))?;
    let status: i64 = row.get("status");

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        mail: row.get("mail"),
        password_hash: row.get("password"),
        user_type,
        imgurl: row.get("imgurl"),
        status: UserStatus::from_i64(status),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        last_login_at: row.try_get("last_login_at").ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxUserRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxUserRepository::new(pool.clone());
        (pool, repo)
    }

    fn test_user(username: &str, mail: &str) -> User {
        User::new(
            username.to_string(),
            mail.to_string(),
            "$2b$10$testhashtesthashtesthash".to_string(),
            UserRole::Normal,
            None,
        )
    }

    #[tokio::test]
    async fn test_create_user() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo
            .create(&test_user("tester", "tester@linlog.com"))
            .await
            .expect("Failed to create user");

        assert!(created.id > 0);
        assert_eq!(created.username, "tester");
        assert_eq!(created.user_type, UserRole::Normal);
        assert_eq!(created.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn test_get_by_mail() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&test_user("tester", "findme@linlog.com"))
            .await
            .unwrap();

        let found = repo
            .get_by_mail("findme@linlog.com")
            .await
            .expect("Failed to get user")
            .expect("User not found");
        assert_eq!(found.mail, "findme@linlog.com");

        let missing = repo.get_by_mail("ghost@linlog.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_by_username() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&test_user("byname", "byname@linlog.com"))
            .await
            .unwrap();

        let found = repo
            .get_by_username("byname")
            .await
            .unwrap()
            .expect("User not found");
        assert_eq!(found.username, "byname");
    }

    #[tokio::test]
    async fn test_unique_mail_constraint() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&test_user("first", "dup@linlog.com"))
            .await
            .unwrap();

        let result = repo.create(&test_user("second", "dup@linlog.com")).await;
        assert!(result.is_err(), "Duplicate mail must be rejected");
    }

    #[tokio::test]
    async fn test_touch_last_login() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo
            .create(&test_user("login", "login@linlog.com"))
            .await
            .unwrap();
        assert!(created.last_login_at.is_none());

        repo.touch_last_login(created.id).await.unwrap();

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert!(found.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_count() {
        let (_pool, repo) = setup_test_repo().await;
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.create(&test_user("a", "a@linlog.com")).await.unwrap();
        repo.create(&test_user("b", "b@linlog.com")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
