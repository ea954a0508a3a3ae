//! Player save persistence
//!
//! Saves are addressed by their shareable token with no ownership check.
//! Concurrent writers to the same token are last-write-wins.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::time::Duration;

use foodcraft_common::{time, Error, GameId, GameState, Ingredient, Result};

#[async_trait]
pub trait GameStateStore: Send + Sync {
    /// Upsert the inventory and refresh `last_accessed`
    async fn save(&self, game_id: &GameId, discoveries: &[Ingredient]) -> Result<GameState>;

    /// Fetch a save, refreshing `last_accessed`
    async fn load(&self, game_id: &GameId) -> Result<Option<GameState>>;

    /// Refresh `last_accessed` only; false if the save does not exist
    async fn touch(&self, game_id: &GameId) -> Result<bool>;

    /// Delete saves idle for longer than `max_idle`; returns the deleted count
    async fn sweep_older_than(&self, max_idle: Duration) -> Result<u64>;
}

/// SQLite-backed game state store
#[derive(Clone)]
pub struct SqliteGameStateStore {
    pool: SqlitePool,
}

impl SqliteGameStateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn decode_discoveries(raw: &str) -> Result<Vec<Ingredient>> {
    serde_json::from_str(raw)
        .map_err(|e| Error::Internal(format!("Failed to deserialize discoveries: {}", e)))
}

#[async_trait]
impl GameStateStore for SqliteGameStateStore {
    async fn save(&self, game_id: &GameId, discoveries: &[Ingredient]) -> Result<GameState> {
        let encoded = serde_json::to_string(discoveries)
            .map_err(|e| Error::Internal(format!("Failed to serialize discoveries: {}", e)))?;
        let now = time::now_millis();

        sqlx::query(
            r#"
            INSERT INTO game_states (game_id, discoveries, last_accessed)
            VALUES (?, ?, ?)
            ON CONFLICT(game_id) DO UPDATE SET
                discoveries = excluded.discoveries,
                last_accessed = excluded.last_accessed
            "#,
        )
        .bind(game_id.as_str())
        .bind(&encoded)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(GameState {
            game_id: game_id.clone(),
            discoveries: discoveries.to_vec(),
            last_accessed: time::from_millis(now),
        })
    }

    async fn load(&self, game_id: &GameId) -> Result<Option<GameState>> {
        let row = sqlx::query_as::<_, (String, i64)>(
            r#"
            UPDATE game_states
            SET last_accessed = ?
            WHERE game_id = ?
            RETURNING discoveries, last_accessed
            "#,
        )
        .bind(time::now_millis())
        .bind(game_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((discoveries, last_accessed)) => Ok(Some(GameState {
                game_id: game_id.clone(),
                discoveries: decode_discoveries(&discoveries)?,
                last_accessed: time::from_millis(last_accessed),
            })),
            None => Ok(None),
        }
    }

    async fn touch(&self, game_id: &GameId) -> Result<bool> {
        let updated = sqlx::query("UPDATE game_states SET last_accessed = ? WHERE game_id = ?")
            .bind(time::now_millis())
            .bind(game_id.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }

    async fn sweep_older_than(&self, max_idle: Duration) -> Result<u64> {
        let max_idle_ms = i64::try_from(max_idle.as_millis()).unwrap_or(i64::MAX);
        let threshold = time::now_millis().saturating_sub(max_idle_ms);

        let deleted = sqlx::query("DELETE FROM game_states WHERE last_accessed < ?")
            .bind(threshold)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}
