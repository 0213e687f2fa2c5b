//! # Held Order Repository
//!
//! Parked carts a cashier can resume later without losing line items.
//!
//! ## Lifecycle
//! ```text
//! hold()  ── snapshot JSON ──► held_orders row
//! take()  ── SELECT + DELETE ──► snapshot restored into a fresh session
//! discard() ── DELETE ──► gone
//! ```
//!
//! The snapshot is opaque JSON to this layer; the terminal owns its shape
//! (cart lines + cart discount + attached customer).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;

/// A parked cart.
///
/// Serializes camelCase for the lane UI's holds list.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HeldOrder {
    /// Hold id (UUID v4).
    pub id: String,
    /// Optional operator-facing label ("table 4", customer name, ...).
    pub label: String,
    /// Opaque snapshot JSON.
    pub snapshot: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for held-order operations.
#[derive(Debug, Clone)]
pub struct HoldRepository {
    pool: SqlitePool,
}

impl HoldRepository {
    /// Creates a new HoldRepository.
    pub fn new(pool: SqlitePool) -> Self {
        HoldRepository { pool }
    }

    /// Parks a snapshot and returns the stored hold.
    pub async fn hold(&self, label: &str, snapshot: &str) -> StoreResult<HeldOrder> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(hold_id = %id, label = %label, "Holding order");

        sqlx::query(
            r#"
            INSERT INTO held_orders (id, label, snapshot, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&id)
        .bind(label)
        .bind(snapshot)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(HeldOrder {
            id,
            label: label.to_string(),
            snapshot: snapshot.to_string(),
            created_at: now,
        })
    }

    /// Lists all holds, oldest first.
    pub async fn list(&self) -> StoreResult<Vec<HeldOrder>> {
        let holds = sqlx::query_as::<_, HeldOrder>(
            r#"
            SELECT id, label, snapshot, created_at
            FROM held_orders
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(holds)
    }

    /// Takes a hold for resumption: returns it and deletes the row.
    ///
    /// Returns `None` if the hold doesn't exist (e.g. already resumed).
    pub async fn take(&self, id: &str) -> StoreResult<Option<HeldOrder>> {
        let hold = sqlx::query_as::<_, HeldOrder>(
            r#"
            SELECT id, label, snapshot, created_at
            FROM held_orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if hold.is_some() {
            debug!(hold_id = %id, "Resuming held order");
            sqlx::query("DELETE FROM held_orders WHERE id = ?1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        }

        Ok(hold)
    }

    /// Discards a hold without resuming it. Returns whether a row existed.
    pub async fn discard(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM held_orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of parked carts.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM held_orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};

    async fn test_store() -> Store {
        Store::new(StoreConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_hold_and_list() {
        let store = test_store().await;
        let holds = store.holds();

        let held = holds.hold("table 4", r#"{"lines":[]}"#).await.unwrap();
        assert_eq!(held.label, "table 4");

        let all = holds.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, held.id);
        assert_eq!(holds.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_take_deletes_the_hold() {
        let store = test_store().await;
        let holds = store.holds();

        let held = holds.hold("", r#"{"lines":[1]}"#).await.unwrap();

        let taken = holds.take(&held.id).await.unwrap().unwrap();
        assert_eq!(taken.snapshot, r#"{"lines":[1]}"#);

        // Second take finds nothing - a hold resumes exactly once.
        assert!(holds.take(&held.id).await.unwrap().is_none());
        assert_eq!(holds.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_discard() {
        let store = test_store().await;
        let holds = store.holds();

        let held = holds.hold("x", "{}").await.unwrap();
        assert!(holds.discard(&held.id).await.unwrap());
        assert!(!holds.discard(&held.id).await.unwrap());
    }
}
