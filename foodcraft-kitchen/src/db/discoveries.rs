//! Global discovery cache
//!
//! Rows are append-once per canonical pair. The only write path is
//! `insert_if_absent`, which is atomic at the database: two callers racing
//! on a new pair both get back the same (first) row.

use async_trait::async_trait;
use sqlx::SqlitePool;

use foodcraft_common::{time, CanonicalPair, Discovery, Error, Result};

/// Result of an insert-if-absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// This call created the row
    Inserted(Discovery),
    /// A row already existed; it is returned unchanged
    Existing(Discovery),
}

impl InsertOutcome {
    pub fn was_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }

    pub fn into_discovery(self) -> Discovery {
        match self {
            InsertOutcome::Inserted(d) | InsertOutcome::Existing(d) => d,
        }
    }
}

/// Discovery storage consumed by the resolver
#[async_trait]
pub trait DiscoveryStore: Send + Sync {
    async fn find_by_canonical_pair(&self, pair: &CanonicalPair) -> Result<Option<Discovery>>;

    /// Store the row unless one exists for the same canonical pair
    async fn insert_if_absent(&self, discovery: Discovery) -> Result<InsertOutcome>;

    async fn count(&self) -> Result<u64>;

    /// Delete every cached discovery (maintenance only)
    async fn clear(&self) -> Result<u64>;
}

type DiscoveryRow = (String, String, String, String, Option<String>);

fn from_row(row: DiscoveryRow) -> Discovery {
    Discovery {
        ingredient1: row.0,
        ingredient2: row.1,
        result_name: row.2,
        result_emoji: row.3,
        result_image_url: row.4,
    }
}

/// SQLite-backed discovery store
#[derive(Clone)]
pub struct SqliteDiscoveryStore {
    pool: SqlitePool,
}

impl SqliteDiscoveryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiscoveryStore for SqliteDiscoveryStore {
    async fn find_by_canonical_pair(&self, pair: &CanonicalPair) -> Result<Option<Discovery>> {
        let row = sqlx::query_as::<_, DiscoveryRow>(
            r#"
            SELECT ingredient1, ingredient2, result_name, result_emoji, result_image_url
            FROM discoveries
            WHERE ingredient1 = ? AND ingredient2 = ?
            "#,
        )
        .bind(pair.first())
        .bind(pair.second())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(from_row))
    }

    async fn insert_if_absent(&self, discovery: Discovery) -> Result<InsertOutcome> {
        // Re-canonicalize so a hand-built row can never violate the key order
        let pair = discovery.pair();

        let inserted = sqlx::query(
            r#"
            INSERT INTO discoveries (
                ingredient1, ingredient2, result_name, result_emoji, result_image_url, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(ingredient1, ingredient2) DO NOTHING
            "#,
        )
        .bind(pair.first())
        .bind(pair.second())
        .bind(&discovery.result_name)
        .bind(&discovery.result_emoji)
        .bind(&discovery.result_image_url)
        .bind(time::now_millis())
        .execute(&self.pool)
        .await?
        .rows_affected()
            == 1;

        let stored = self.find_by_canonical_pair(&pair).await?.ok_or_else(|| {
            Error::Internal(format!("discovery for {} vanished after insert", pair))
        })?;

        Ok(if inserted {
            InsertOutcome::Inserted(stored)
        } else {
            InsertOutcome::Existing(stored)
        })
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM discoveries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn clear(&self) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM discoveries")
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodcraft_common::db::create_tables;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_store() -> SqliteDiscoveryStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_tables(&pool).await.unwrap();
        SqliteDiscoveryStore::new(pool)
    }

    #[tokio::test]
    async fn test_find_missing_pair() {
        let store = setup_store().await;
        let found = store
            .find_by_canonical_pair(&CanonicalPair::new("Water", "Fire"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_insert_then_find_either_order() {
        let store = setup_store().await;
        let discovery =
            Discovery::new(CanonicalPair::new("Sugar", "Salt"), "Salted Caramel", "🍮", None);

        let outcome = store.insert_if_absent(discovery.clone()).await.unwrap();
        assert!(outcome.was_inserted());

        let found = store
            .find_by_canonical_pair(&CanonicalPair::new("Salt", "Sugar"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, discovery);
        assert_eq!(found.ingredient1, "Salt");
        assert_eq!(found.ingredient2, "Sugar");
    }

    #[tokio::test]
    async fn test_second_insert_keeps_first_row() {
        let store = setup_store().await;
        let pair = CanonicalPair::new("Fire", "Water");
        let first = Discovery::new(pair.clone(), "Steam", "♨️", None);
        let second =
            Discovery::new(pair.clone(), "Boiled Water", "🫖", Some("data:x".to_string()));

        store.insert_if_absent(first.clone()).await.unwrap();
        let outcome = store.insert_if_absent(second).await.unwrap();

        assert_eq!(outcome, InsertOutcome::Existing(first));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_hand_built_unsorted_row_is_canonicalized() {
        let store = setup_store().await;
        let unsorted = Discovery {
            ingredient1: "Water".to_string(),
            ingredient2: "Earth".to_string(),
            result_name: "Mud".to_string(),
            result_emoji: "🟤".to_string(),
            result_image_url: None,
        };

        let stored = store.insert_if_absent(unsorted).await.unwrap().into_discovery();
        assert_eq!(stored.ingredient1, "Earth");
        assert_eq!(stored.ingredient2, "Water");
    }

    #[tokio::test]
    async fn test_clear() {
        let store = setup_store().await;
        store
            .insert_if_absent(Discovery::new(CanonicalPair::new("A", "B"), "AB", "🅰️", None))
            .await
            .unwrap();
        store
            .insert_if_absent(Discovery::new(CanonicalPair::new("C", "D"), "CD", "🇨", None))
            .await
            .unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
