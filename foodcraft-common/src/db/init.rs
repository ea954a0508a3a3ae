//! Database initialization
//!
//! Creates the database file on first run and the tables if they are missing.
//! Table creation is idempotent, so it runs on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Open (or create) the database and ensure all tables exist
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // WAL lets the HTTP handlers read while the sweeper or a resolver writes
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create every FoodCraft table (idempotent)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_discoveries_table(pool).await?;
    create_game_states_table(pool).await?;
    Ok(())
}

/// Global discovery cache, one row per canonical pair
pub async fn create_discoveries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS discoveries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ingredient1 TEXT NOT NULL,
            ingredient2 TEXT NOT NULL,
            result_name TEXT NOT NULL,
            result_emoji TEXT NOT NULL,
            result_image_url TEXT,
            created_at INTEGER NOT NULL,
            UNIQUE (ingredient1, ingredient2),
            CHECK (ingredient1 <= ingredient2)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Player saves addressed by their shareable token
pub async fn create_game_states_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS game_states (
            game_id TEXT PRIMARY KEY,
            discoveries TEXT NOT NULL,
            last_accessed INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_game_states_last_accessed ON game_states(last_accessed)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_tables_is_idempotent() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        create_tables(&pool).await.unwrap();
        create_tables(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables, vec!["discoveries".to_string(), "game_states".to_string()]);
    }

    #[tokio::test]
    async fn test_discoveries_rejects_non_canonical_rows() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_tables(&pool).await.unwrap();

        let result = sqlx::query(
            "INSERT INTO discoveries (ingredient1, ingredient2, result_name, result_emoji, created_at)
             VALUES ('Sugar', 'Salt', 'Caramel', '🍮', 0)",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "CHECK constraint should reject unsorted pair");
    }
}
