//! # Order Outbox Repository
//!
//! The durable order-submission queue.
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Outbox Pattern Implementation                        │
//! │                                                                         │
//! │  SUBMIT FAILS WITH A RETRYABLE ERROR (offline, timeout, 5xx)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO order_outbox (request_id, payload, next_attempt_at)       │
//! │       │   request_id = the checkout's idempotency key                  │
//! │       │   INSERT OR IGNORE → re-enqueueing the same checkout is a      │
//! │       │   no-op, never a duplicate                                     │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            BACKGROUND FLUSHER (vendra-terminal)                 │   │
//! │  │                                                                 │   │
//! │  │  1. due(limit, now): pending entries whose next_attempt_at     │   │
//! │  │     has passed, oldest first                                   │   │
//! │  │  2. POST each with its Idempotency-Key header                  │   │
//! │  │  3. Accepted   → mark_submitted(request_id, order_id)          │   │
//! │  │     Retryable  → mark_failed(request_id, err, next_attempt)    │   │
//! │  │     Permanent  → abandon(request_id, err)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  KEY GUARANTEES:                                                       │
//! │  • The sale is never lost (it's on local disk)                         │
//! │  • The server dedups by idempotency key, so flush + manual retry       │
//! │    can race without creating duplicate orders                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use vendra_core::OrderRequest;

/// A row in the order outbox.
///
/// Serializes camelCase for the lane UI's pending-submissions view.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    /// The checkout's idempotency key.
    pub request_id: String,
    /// Full OrderRequest JSON.
    pub payload: String,
    /// Number of delivery attempts so far.
    pub attempts: i64,
    /// Last error message if delivery failed.
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Not eligible for flushing before this instant.
    pub next_attempt_at: DateTime<Utc>,
    /// When delivery was last attempted.
    pub attempted_at: Option<DateTime<Utc>>,
    /// When the backend accepted the order.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Order id assigned by the backend on acceptance.
    pub order_id: Option<String>,
    /// Set when a permanent failure removed the entry from rotation.
    pub abandoned_at: Option<DateTime<Utc>>,
}

impl OutboxEntry {
    /// True while the entry still awaits delivery.
    pub fn is_pending(&self) -> bool {
        self.submitted_at.is_none() && self.abandoned_at.is_none()
    }

    /// Decodes the stored payload back into an [`OrderRequest`].
    pub fn request(&self) -> StoreResult<OrderRequest> {
        serde_json::from_str(&self.payload).map_err(|e| StoreError::CorruptPayload {
            entity: "OutboxEntry".to_string(),
            id: self.request_id.clone(),
            reason: e.to_string(),
        })
    }
}

/// Repository for outbox operations.
#[derive(Debug, Clone)]
pub struct OutboxRepository {
    pool: SqlitePool,
}

impl OutboxRepository {
    /// Creates a new OutboxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OutboxRepository { pool }
    }

    /// Enqueues an order request under its idempotency key.
    ///
    /// ## Dedup
    /// `INSERT OR IGNORE` on the primary key: enqueueing the same checkout
    /// twice stores it once. Returns whether a new row was inserted.
    pub async fn enqueue(&self, request: &OrderRequest) -> StoreResult<bool> {
        let request_id = request.client_request_id.to_string();
        let payload = serde_json::to_string(request)
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let now = Utc::now();

        debug!(request_id = %request_id, "Enqueueing order for delivery");

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO order_outbox (
                request_id, payload, attempts, last_error,
                created_at, next_attempt_at
            ) VALUES (?1, ?2, 0, NULL, ?3, ?3)
            "#,
        )
        .bind(request_id)
        .bind(payload)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns up to `limit` pending entries whose `next_attempt_at` has
    /// passed, oldest first.
    pub async fn due(&self, limit: u32, now: DateTime<Utc>) -> StoreResult<Vec<OutboxEntry>> {
        let entries = sqlx::query_as::<_, OutboxEntry>(
            r#"
            SELECT
                request_id, payload, attempts, last_error,
                created_at, next_attempt_at, attempted_at,
                submitted_at, order_id, abandoned_at
            FROM order_outbox
            WHERE submitted_at IS NULL
              AND abandoned_at IS NULL
              AND next_attempt_at <= ?1
            ORDER BY created_at, request_id
            LIMIT ?2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Gets one entry by its request id.
    pub async fn get(&self, request_id: &str) -> StoreResult<Option<OutboxEntry>> {
        let entry = sqlx::query_as::<_, OutboxEntry>(
            r#"
            SELECT
                request_id, payload, attempts, last_error,
                created_at, next_attempt_at, attempted_at,
                submitted_at, order_id, abandoned_at
            FROM order_outbox
            WHERE request_id = ?1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Marks an entry as accepted by the backend.
    pub async fn mark_submitted(&self, request_id: &str, order_id: &str) -> StoreResult<()> {
        let now = Utc::now();

        debug!(request_id = %request_id, order_id = %order_id, "Outbox entry submitted");

        sqlx::query(
            r#"
            UPDATE order_outbox SET
                submitted_at = ?2,
                attempted_at = ?2,
                order_id = ?3,
                last_error = NULL
            WHERE request_id = ?1 AND submitted_at IS NULL
            "#,
        )
        .bind(request_id)
        .bind(now)
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records a failed delivery attempt and schedules the next one.
    pub async fn mark_failed(
        &self,
        request_id: &str,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE order_outbox SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3,
                next_attempt_at = ?4
            WHERE request_id = ?1 AND submitted_at IS NULL
            "#,
        )
        .bind(request_id)
        .bind(error)
        .bind(now)
        .bind(next_attempt_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes an entry from rotation after a permanent failure.
    ///
    /// The row is kept (with `abandoned_at` set) so the failure remains
    /// visible to the operator instead of silently vanishing.
    pub async fn abandon(&self, request_id: &str, error: &str) -> StoreResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE order_outbox SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3,
                abandoned_at = ?3
            WHERE request_id = ?1 AND submitted_at IS NULL
            "#,
        )
        .bind(request_id)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of entries still awaiting delivery.
    pub async fn pending_count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM order_outbox
            WHERE submitted_at IS NULL AND abandoned_at IS NULL
            "#,
        )
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
    use chrono::Duration;
    use uuid::Uuid;
    use vendra_core::types::DiscountRate;

    async fn test_store() -> Store {
        Store::new(StoreConfig::in_memory()).await.unwrap()
    }

    /// A minimal settled order request with a deterministic request id.
    fn request(seq: u8) -> OrderRequest {
        let id = Uuid::parse_str(&format!(
            "00000000-0000-0000-0000-0000000000{:02x}",
            seq
        ))
        .unwrap();
        OrderRequest {
            client_request_id: id,
            items: Vec::new(),
            customer_id: None,
            discount: DiscountRate::zero(),
            subtotal_cents: 1800,
            tax_cents: 90,
            total_cents: 1890,
            payments: Vec::new(),
            ewallet_cents: 0,
            loyalty_points_used: 0,
            store_id: "store-001".to_string(),
            branch_id: "branch-01".to_string(),
            is_online: false,
        }
    }

    fn rid(seq: u8) -> String {
        request(seq).client_request_id.to_string()
    }

    #[tokio::test]
    async fn test_enqueue_and_due() {
        let store = test_store().await;
        let outbox = store.outbox();

        assert!(outbox.enqueue(&request(1)).await.unwrap());
        assert_eq!(outbox.pending_count().await.unwrap(), 1);

        let due = outbox.due(10, Utc::now()).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].request_id, rid(1));
        assert_eq!(due[0].attempts, 0);
        assert!(due[0].is_pending());

        // The payload decodes back into the request that went in.
        let decoded = due[0].request().unwrap();
        assert_eq!(decoded.total_cents, 1890);
    }

    /// One request id is stored once, ever.
    #[tokio::test]
    async fn test_enqueue_dedups_by_request_id() {
        let store = test_store().await;
        let outbox = store.outbox();

        let mut first = request(1);
        first.total_cents = 1000;
        let mut second = request(1);
        second.total_cents = 2000;

        assert!(outbox.enqueue(&first).await.unwrap());
        assert!(!outbox.enqueue(&second).await.unwrap());

        assert_eq!(outbox.pending_count().await.unwrap(), 1);
        // The original payload wins.
        let entry = outbox.get(&rid(1)).await.unwrap().unwrap();
        assert_eq!(entry.request().unwrap().total_cents, 1000);
    }

    /// An entry never surfaces before its schedule.
    #[tokio::test]
    async fn test_due_respects_schedule() {
        let store = test_store().await;
        let outbox = store.outbox();

        outbox.enqueue(&request(1)).await.unwrap();
        let future = Utc::now() + Duration::minutes(5);
        outbox
            .mark_failed(&rid(1), "connection refused", future)
            .await
            .unwrap();

        // Not due now...
        assert!(outbox.due(10, Utc::now()).await.unwrap().is_empty());
        // ...but due once the schedule passes.
        let later = Utc::now() + Duration::minutes(6);
        let due = outbox.due(10, later).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].attempts, 1);
        assert_eq!(due[0].last_error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_mark_submitted_removes_from_rotation() {
        let store = test_store().await;
        let outbox = store.outbox();

        outbox.enqueue(&request(1)).await.unwrap();
        outbox.mark_submitted(&rid(1), "order-42").await.unwrap();

        assert_eq!(outbox.pending_count().await.unwrap(), 0);
        assert!(outbox.due(10, Utc::now()).await.unwrap().is_empty());

        let entry = outbox.get(&rid(1)).await.unwrap().unwrap();
        assert!(!entry.is_pending());
        assert_eq!(entry.order_id.as_deref(), Some("order-42"));
        assert!(entry.submitted_at.is_some());
    }

    #[tokio::test]
    async fn test_abandon_keeps_row_visible() {
        let store = test_store().await;
        let outbox = store.outbox();

        outbox.enqueue(&request(1)).await.unwrap();
        outbox
            .abandon(&rid(1), "422: cart no longer valid")
            .await
            .unwrap();

        assert_eq!(outbox.pending_count().await.unwrap(), 0);
        let entry = outbox.get(&rid(1)).await.unwrap().unwrap();
        assert!(entry.abandoned_at.is_some());
        assert_eq!(
            entry.last_error.as_deref(),
            Some("422: cart no longer valid")
        );
    }

    #[tokio::test]
    async fn test_due_is_oldest_first_and_limited() {
        let store = test_store().await;
        let outbox = store.outbox();

        for i in 1..=5 {
            outbox.enqueue(&request(i)).await.unwrap();
        }

        let due = outbox.due(3, Utc::now()).await.unwrap();
        assert_eq!(due.len(), 3);
        assert_eq!(due[0].request_id, rid(1));
    }
}
