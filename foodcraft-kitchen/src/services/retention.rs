//! Periodic deletion of idle game saves

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use foodcraft_common::config::RetentionConfig;
use foodcraft_common::Result;

use crate::db::GameStateStore;

/// Run one sweep
pub async fn sweep_once(store: &dyn GameStateStore, max_idle: Duration) -> Result<u64> {
    let deleted = store.sweep_older_than(max_idle).await?;
    info!(
        deleted,
        max_idle_days = max_idle.as_secs() / 86_400,
        "Swept idle game states"
    );
    Ok(deleted)
}

/// Sweep immediately, then every `sweep_interval`, until cancelled
pub fn spawn_sweeper(
    store: Arc<dyn GameStateStore>,
    config: RetentionConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.sweep_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Retention sweeper stopped");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = sweep_once(store.as_ref(), config.max_idle()).await {
                        error!("Game state sweep failed: {}", e);
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteGameStateStore;
    use foodcraft_common::db::create_tables;
    use foodcraft_common::models::base_ingredients;
    use foodcraft_common::{time, GameId};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, Arc<SqliteGameStateStore>) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_tables(&pool).await.unwrap();
        (pool.clone(), Arc::new(SqliteGameStateStore::new(pool)))
    }

    async fn insert_stale(pool: &SqlitePool, store: &SqliteGameStateStore) -> GameId {
        let game_id = GameId::generate();
        store.save(&game_id, &base_ingredients()).await.unwrap();
        sqlx::query("UPDATE game_states SET last_accessed = ? WHERE game_id = ?")
            .bind(time::now_millis() - 40 * 86_400_000)
            .bind(game_id.as_str())
            .execute(pool)
            .await
            .unwrap();
        game_id
    }

    #[tokio::test]
    async fn test_sweep_once() {
        let (pool, store) = setup().await;
        insert_stale(&pool, &store).await;
        store.save(&GameId::generate(), &base_ingredients()).await.unwrap();

        let deleted = sweep_once(store.as_ref(), RetentionConfig::default().max_idle())
            .await
            .unwrap();
        assert_eq!(deleted, 1);
    }

    #[tokio::test]
    async fn test_sweeper_runs_immediately_and_stops_on_cancel() {
        let (pool, store) = setup().await;
        let stale = insert_stale(&pool, &store).await;

        let cancel = CancellationToken::new();
        let handle = spawn_sweeper(store.clone(), RetentionConfig::default(), cancel.clone());

        // First tick fires right away
        let mut swept = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM game_states WHERE game_id = ?")
                .bind(stale.as_str())
                .fetch_one(&pool)
                .await
                .unwrap();
            if count == 0 {
                swept = true;
                break;
            }
        }
        assert!(swept, "stale save should be swept on the first tick");

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper should stop after cancel")
            .unwrap();
    }
}
