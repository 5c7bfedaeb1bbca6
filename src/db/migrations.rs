//! Database migrations module
//!
//! Code-based migrations embedded in the binary as SQL strings, with
//! variants for both SQLite and MySQL so a single deployment artifact
//! works against either backend.
//!
//! Each migration is a `Migration` struct:
//! - `version`: unique version number for ordering
//! - `name`: human-readable migration name
//! - `up_sqlite` / `up_mysql`: dialect-specific SQL

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};

use super::DynDatabasePool;
use crate::config::DatabaseDriver;

/// A database migration with SQL for both SQLite and MySQL
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements for SQLite
    pub up_sqlite: &'static str,
    /// SQL statements for MySQL
    pub up_mysql: &'static str,
}

/// Migration record stored in the database
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// All migrations for linlog, in application order.
pub const MIGRATIONS: &[Migration] = &[
    // Migration 1: users table
    Migration {
        version: 1,
        name: "create_users",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                mail VARCHAR(100) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,
                user_type VARCHAR(20) NOT NULL DEFAULT 'normal',
                imgurl VARCHAR(255),
                status INTEGER NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                last_login_at TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_user_type ON users(user_type);
            CREATE INDEX IF NOT EXISTS idx_users_status ON users(status);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                mail VARCHAR(100) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,
                user_type VARCHAR(20) NOT NULL DEFAULT 'normal',
                imgurl VARCHAR(255),
                status TINYINT(1) NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                last_login_at DATETIME
            );
            CREATE INDEX idx_users_user_type ON users(user_type);
            CREATE INDEX idx_users_status ON users(status);
        "#,
    },
    // Migration 2: subset (category) table
    Migration {
        version: 2,
        name: "create_subset",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS subset (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subset_name VARCHAR(50) NOT NULL,
                classify VARCHAR(20) NOT NULL,
                status INTEGER NOT NULL DEFAULT 1,
                sort INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (subset_name, classify)
            );
            CREATE INDEX IF NOT EXISTS idx_subset_classify ON subset(classify);
            CREATE INDEX IF NOT EXISTS idx_subset_status ON subset(status);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS subset (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                subset_name VARCHAR(50) NOT NULL,
                classify VARCHAR(20) NOT NULL,
                status TINYINT(1) NOT NULL DEFAULT 1,
                sort INT NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                UNIQUE KEY uk_subset_classify (subset_name, classify)
            );
            CREATE INDEX idx_subset_classify ON subset(classify);
            CREATE INDEX idx_subset_status ON subset(status);
        "#,
    },
    // Migration 3: file metadata table
    Migration {
        version: 3,
        name: "create_file",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS file (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_name VARCHAR(100) NOT NULL,
                format VARCHAR(32) NOT NULL,
                size INTEGER,
                url VARCHAR(255) NOT NULL,
                subset_id INTEGER,
                status INTEGER NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (subset_id) REFERENCES subset(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_file_subset ON file(subset_id);
            CREATE INDEX IF NOT EXISTS idx_file_format ON file(format);
            CREATE INDEX IF NOT EXISTS idx_file_status ON file(status);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS file (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                file_name VARCHAR(100) NOT NULL,
                format VARCHAR(32) NOT NULL,
                size INT,
                url VARCHAR(255) NOT NULL,
                subset_id BIGINT,
                status TINYINT(1) NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (subset_id) REFERENCES subset(id) ON DELETE SET NULL
            );
            CREATE INDEX idx_file_subset ON file(subset_id);
            CREATE INDEX idx_file_format ON file(format);
            CREATE INDEX idx_file_status ON file(status);
        "#,
    },
    // Migration 4: article table (articles and image collections)
    Migration {
        version: 4,
        name: "create_article",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS article (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(150) NOT NULL,
                subset_id INTEGER,
                classify VARCHAR(20) NOT NULL,
                label VARCHAR(100) NOT NULL DEFAULT '',
                introduce VARCHAR(512) NOT NULL DEFAULT '',
                content TEXT NOT NULL,
                cover VARCHAR(255) NOT NULL DEFAULT '',
                user_id INTEGER NOT NULL,
                views INTEGER NOT NULL DEFAULT 0,
                likes INTEGER NOT NULL DEFAULT 0,
                comments INTEGER NOT NULL DEFAULT 0,
                state VARCHAR(20) NOT NULL DEFAULT 'draft',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                published_at TIMESTAMP,
                FOREIGN KEY (subset_id) REFERENCES subset(id) ON DELETE SET NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_article_subset ON article(subset_id);
            CREATE INDEX IF NOT EXISTS idx_article_classify ON article(classify);
            CREATE INDEX IF NOT EXISTS idx_article_state ON article(state);
            CREATE INDEX IF NOT EXISTS idx_article_user ON article(user_id);
            CREATE INDEX IF NOT EXISTS idx_article_created_at ON article(created_at);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS article (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                title VARCHAR(150) NOT NULL,
                subset_id BIGINT,
                classify VARCHAR(20) NOT NULL,
                label VARCHAR(100) NOT NULL DEFAULT '',
                introduce VARCHAR(512) NOT NULL DEFAULT '',
                content LONGTEXT NOT NULL,
                cover VARCHAR(255) NOT NULL DEFAULT '',
                user_id BIGINT NOT NULL,
                views INT NOT NULL DEFAULT 0,
                likes INT NOT NULL DEFAULT 0,
                comments INT NOT NULL DEFAULT 0,
                state VARCHAR(20) NOT NULL DEFAULT 'draft',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                published_at DATETIME,
                FOREIGN KEY (subset_id) REFERENCES subset(id) ON DELETE SET NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_article_subset ON article(subset_id);
            CREATE INDEX idx_article_classify ON article(classify);
            CREATE INDEX idx_article_state ON article(state);
            CREATE INDEX idx_article_user ON article(user_id);
            CREATE INDEX idx_article_created_at ON article(created_at);
        "#,
    },
    // Migration 5: praise table (one like per user per article)
    Migration {
        version: 5,
        name: "create_praise",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS praise (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                article_id INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (article_id) REFERENCES article(id) ON DELETE CASCADE,
                UNIQUE (user_id, article_id)
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS praise (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                user_id BIGINT NOT NULL,
                article_id BIGINT NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (article_id) REFERENCES article(id) ON DELETE CASCADE,
                UNIQUE KEY uk_user_article (user_id, article_id)
            );
        "#,
    },
    // Migration 6: comment table
    Migration {
        version: 6,
        name: "create_comment",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS comment (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                article_id INTEGER NOT NULL,
                parent_id INTEGER NOT NULL DEFAULT 0,
                content VARCHAR(512) NOT NULL,
                complaint INTEGER NOT NULL DEFAULT 0,
                is_read INTEGER NOT NULL DEFAULT 0,
                status INTEGER NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (article_id) REFERENCES article(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_comment_article ON comment(article_id);
            CREATE INDEX IF NOT EXISTS idx_comment_user ON comment(user_id);
            CREATE INDEX IF NOT EXISTS idx_comment_parent ON comment(parent_id);
            CREATE INDEX IF NOT EXISTS idx_comment_created_at ON comment(created_at);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS comment (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                user_id BIGINT NOT NULL,
                article_id BIGINT NOT NULL,
                parent_id BIGINT NOT NULL DEFAULT 0,
                content VARCHAR(512) NOT NULL,
                complaint INT NOT NULL DEFAULT 0,
                is_read TINYINT(1) NOT NULL DEFAULT 0,
                status TINYINT(1) NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (article_id) REFERENCES article(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_comment_article ON comment(article_id);
            CREATE INDEX idx_comment_user ON comment(user_id);
            CREATE INDEX idx_comment_parent ON comment(parent_id);
            CREATE INDEX idx_comment_created_at ON comment(created_at);
        "#,
    },
    // Migration 7: weather dictionary, seeded here so diary entries can
    // reference it out of the box
    Migration {
        version: 7,
        name: "create_weather",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS weather (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                weather_name VARCHAR(20) NOT NULL UNIQUE,
                icon VARCHAR(255),
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            INSERT OR IGNORE INTO weather (weather_name) VALUES ('晴');
            INSERT OR IGNORE INTO weather (weather_name) VALUES ('多云');
            INSERT OR IGNORE INTO weather (weather_name) VALUES ('阴');
            INSERT OR IGNORE INTO weather (weather_name) VALUES ('雨');
            INSERT OR IGNORE INTO weather (weather_name) VALUES ('雪');
            INSERT OR IGNORE INTO weather (weather_name) VALUES ('雾');
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS weather (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                weather_name VARCHAR(20) NOT NULL UNIQUE,
                icon VARCHAR(255),
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            INSERT IGNORE INTO weather (weather_name) VALUES ('晴');
            INSERT IGNORE INTO weather (weather_name) VALUES ('多云');
            INSERT IGNORE INTO weather (weather_name) VALUES ('阴');
            INSERT IGNORE INTO weather (weather_name) VALUES ('雨');
            INSERT IGNORE INTO weather (weather_name) VALUES ('雪');
            INSERT IGNORE INTO weather (weather_name) VALUES ('雾');
        "#,
    },
    // Migration 8: diary table
    Migration {
        version: 8,
        name: "create_diary",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS diary (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(100) NOT NULL,
                content TEXT NOT NULL,
                picture VARCHAR(512) NOT NULL DEFAULT '',
                weather_id INTEGER,
                mood VARCHAR(20) NOT NULL DEFAULT 'calm',
                status INTEGER NOT NULL DEFAULT 1,
                created_at DATE NOT NULL,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (weather_id) REFERENCES weather(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_diary_created_at ON diary(created_at);
            CREATE INDEX IF NOT EXISTS idx_diary_mood ON diary(mood);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS diary (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                title VARCHAR(100) NOT NULL,
                content TEXT NOT NULL,
                picture VARCHAR(512) NOT NULL DEFAULT '',
                weather_id BIGINT,
                mood VARCHAR(20) NOT NULL DEFAULT 'calm',
                status TINYINT(1) NOT NULL DEFAULT 1,
                created_at DATE NOT NULL,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                FOREIGN KEY (weather_id) REFERENCES weather(id) ON DELETE SET NULL
            );
            CREATE INDEX idx_diary_created_at ON diary(created_at);
            CREATE INDEX idx_diary_mood ON diary(mood);
        "#,
    },
    // Migration 9: message table
    Migration {
        version: 9,
        name: "create_message",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS message (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id INTEGER NOT NULL,
                receiver_id INTEGER NOT NULL,
                content VARCHAR(512) NOT NULL,
                is_read INTEGER NOT NULL DEFAULT 0,
                type VARCHAR(20) NOT NULL DEFAULT 'notice',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (sender_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (receiver_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_message_receiver ON message(receiver_id);
            CREATE INDEX IF NOT EXISTS idx_message_is_read ON message(is_read);
            CREATE INDEX IF NOT EXISTS idx_message_type ON message(type);
            CREATE INDEX IF NOT EXISTS idx_message_created_at ON message(created_at);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS message (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                sender_id BIGINT NOT NULL,
                receiver_id BIGINT NOT NULL,
                content VARCHAR(512) NOT NULL,
                is_read TINYINT(1) NOT NULL DEFAULT 0,
                type VARCHAR(20) NOT NULL DEFAULT 'notice',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (sender_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (receiver_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_message_receiver ON message(receiver_id);
            CREATE INDEX idx_message_is_read ON message(is_read);
            CREATE INDEX idx_message_type ON message(type);
            CREATE INDEX idx_message_created_at ON message(created_at);
        "#,
    },
];

/// Run all pending migrations.
///
/// 1. Creates the migrations tracking table if it doesn't exist
/// 2. Checks which migrations have already been applied
/// 3. Runs any pending migrations in order
///
/// Returns the number of migrations applied.
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = get_applied_migrations(pool).await?;
    let applied_versions: Vec<i32> = applied.iter().map(|m| m.version as i32).collect();

    let mut count = 0;

    for migration in MIGRATIONS {
        if !applied_versions.contains(&migration.version) {
            tracing::info!(
                "Applying migration {}: {}",
                migration.version,
                migration.name
            );
            apply_migration(pool, migration)
                .await
                .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

/// Create the migrations tracking table if it doesn't exist
async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
        DatabaseDriver::Mysql => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INT PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
    };

    pool.execute(sql).await?;
    Ok(())
}

/// Get list of already applied migrations
async fn get_applied_migrations(pool: &DynDatabasePool) -> Result<Vec<MigrationRecord>> {
    match pool.driver() {
        DatabaseDriver::Sqlite => get_applied_migrations_sqlite(pool.as_sqlite().unwrap()).await,
        DatabaseDriver::Mysql => get_applied_migrations_mysql(pool.as_mysql().unwrap()).await,
    }
}

async fn get_applied_migrations_sqlite(pool: &SqlitePool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    let mut records = Vec::new();
    for row in rows {
        records.push(MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        });
    }

    Ok(records)
}

async fn get_applied_migrations_mysql(pool: &MySqlPool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    let mut records = Vec::new();
    for row in rows {
        records.push(MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        });
    }

    Ok(records)
}

/// Apply a single migration
async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    match pool.driver() {
        DatabaseDriver::Sqlite => apply_migration_sqlite(pool.as_sqlite().unwrap(), migration).await,
        DatabaseDriver::Mysql => apply_migration_mysql(pool.as_mysql().unwrap(), migration).await,
    }
}

async fn apply_migration_sqlite(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    for statement in split_sql_statements(migration.up_sqlite) {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
        }
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;

    Ok(())
}

async fn apply_migration_mysql(pool: &MySqlPool, migration: &Migration) -> Result<()> {
    for statement in split_sql_statements(migration.up_mysql) {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
        }
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Truncate SQL for error messages
fn truncate_sql(sql: &str) -> String {
    if sql.len() > 100 {
        format!("{}...", &sql[..100])
    } else {
        sql.to_string()
    }
}

/// Split SQL into individual statements
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .collect()
}

/// Check if migrations are up to date
pub async fn is_up_to_date(pool: &DynDatabasePool) -> Result<bool> {
    let _ = create_migrations_table(pool).await;
    let applied = get_applied_migrations(pool).await?;
    Ok(applied.len() == MIGRATIONS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_run_migrations() {
        let pool = create_test_pool().await.expect("Failed to create test pool");

        let count = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(count, MIGRATIONS.len());

        // Running again should apply 0 migrations
        let count = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_is_up_to_date() {
        let pool = create_test_pool().await.expect("Failed to create test pool");

        let up_to_date = is_up_to_date(&pool).await.expect("Failed to check");
        assert!(!up_to_date);

        run_migrations(&pool).await.expect("Failed to run migrations");
        let up_to_date = is_up_to_date(&pool).await.expect("Failed to check");
        assert!(up_to_date);
    }

    #[tokio::test]
    async fn test_users_table_created() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        let sqlite_pool = pool.as_sqlite().unwrap();
        let result = sqlx::query(
            "INSERT INTO users (username, mail, password, user_type) VALUES (?, ?, ?, ?)",
        )
        .bind("tester")
        .bind("tester@linlog.com")
        .bind("hash123")
        .bind("admin")
        .execute(sqlite_pool)
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_weather_dictionary_seeded() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        let sqlite_pool = pool.as_sqlite().unwrap();
        let row = sqlx::query("SELECT COUNT(*) AS count FROM weather")
            .fetch_one(sqlite_pool)
            .await
            .expect("Failed to count weather rows");
        let count: i64 = row.get("count");
        assert_eq!(count, 6);
    }

    #[tokio::test]
    async fn test_praise_unique_constraint() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        let sqlite_pool = pool.as_sqlite().unwrap();
        sqlx::query("INSERT INTO users (username, mail, password) VALUES ('u', 'u@x.com', 'h')")
            .execute(sqlite_pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO article (title, classify, content, user_id) VALUES ('t', 'article', 'c', 1)",
        )
        .execute(sqlite_pool)
        .await
        .unwrap();

        sqlx::query("INSERT INTO praise (user_id, article_id) VALUES (1, 1)")
            .execute(sqlite_pool)
            .await
            .unwrap();
        let duplicate = sqlx::query("INSERT INTO praise (user_id, article_id) VALUES (1, 1)")
            .execute(sqlite_pool)
            .await;

        assert!(duplicate.is_err(), "Second like from same user must violate the unique key");
    }
}
