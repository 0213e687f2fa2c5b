//! # Outbox Flusher
//!
//! Drains the durable submission queue in the background.
//!
//! ## Flush Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Outbox Flusher Flow                                │
//! │                                                                         │
//! │  every poll_interval (or when kicked after an enqueue):                 │
//! │                                                                         │
//! │  1. due(batch_size, now): pending entries whose next_attempt_at        │
//! │     has passed, oldest first                                           │
//! │                                                                         │
//! │  2. attempts ≥ max_attempts?  → warn and skip (operator decides)       │
//! │     payload won't decode?     → abandon (visible, out of rotation)     │
//! │                                                                         │
//! │  3. POST /orders with the entry's Idempotency-Key, with a short        │
//! │     in-pass retry for transient blips                                  │
//! │                                                                         │
//! │  4. accepted        → mark_submitted(request_id, order_id)             │
//! │     retryable error → mark_failed, next_attempt_at =                   │
//! │                       now + base × 2^attempts (capped)                 │
//! │     permanent error → abandon                                          │
//! │                                                                         │
//! │  The server dedups by idempotency key, so this loop racing a manual    │
//! │  retry is harmless.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use vendra_client::{Backend, ClientError};
use vendra_store::{OutboxEntry, Store};

use crate::error::TerminalError;

// =============================================================================
// Configuration
// =============================================================================

/// Flusher tuning.
#[derive(Debug, Clone)]
pub struct FlusherConfig {
    /// How often to poll the outbox.
    pub poll_interval: Duration,
    /// Maximum entries per pass.
    pub batch_size: u32,
    /// After this many failed attempts an entry is skipped with a warning.
    pub max_attempts: i64,
    /// First long-horizon retry delay; doubles per attempt.
    pub backoff_base: Duration,
    /// Ceiling for the long-horizon retry delay.
    pub backoff_cap: Duration,
    /// Budget for the short in-pass retry of one POST.
    pub inpass_max_elapsed: Duration,
}

impl Default for FlusherConfig {
    fn default() -> Self {
        FlusherConfig {
            poll_interval: Duration::from_secs(5),
            batch_size: 20,
            max_attempts: 10,
            backoff_base: Duration::from_secs(2),
            backoff_cap: Duration::from_secs(300),
            inpass_max_elapsed: Duration::from_secs(8),
        }
    }
}

/// The long-horizon retry schedule: `base × 2^attempts`, capped.
pub fn backoff_delay(attempts: i64, base: Duration, cap: Duration) -> Duration {
    let exp = attempts.clamp(0, 20) as u32;
    let delay = base.saturating_mul(1u32 << exp);
    delay.min(cap)
}

// =============================================================================
// Flusher
// =============================================================================

/// Background task draining the order outbox.
pub struct OutboxFlusher {
    store: Store,
    backend: Backend,
    config: FlusherConfig,
    kick_rx: mpsc::Receiver<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling the flusher.
#[derive(Debug, Clone)]
pub struct OutboxFlusherHandle {
    kick_tx: mpsc::Sender<()>,
    shutdown_tx: mpsc::Sender<()>,
}

impl OutboxFlusherHandle {
    /// Nudges the flusher to run a pass now (after an enqueue).
    pub fn kick(&self) {
        let _ = self.kick_tx.try_send(());
    }

    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl OutboxFlusher {
    /// Creates a flusher and its handle.
    pub fn new(
        store: Store,
        backend: Backend,
        config: FlusherConfig,
    ) -> (Self, OutboxFlusherHandle) {
        let (kick_tx, kick_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let flusher = OutboxFlusher {
            store,
            backend,
            config,
            kick_rx,
            shutdown_rx,
        };

        let handle = OutboxFlusherHandle {
            kick_tx,
            shutdown_tx,
        };

        (flusher, handle)
    }

    /// Runs the flush loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!("Outbox flusher starting");

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.process_batch().await {
                        error!(?e, "Outbox pass failed");
                    }
                }

                Some(()) = self.kick_rx.recv() => {
                    debug!("Flusher kicked");
                    if let Err(e) = self.process_batch().await {
                        error!(?e, "Outbox pass failed");
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Outbox flusher shutting down");
                    break;
                }
            }
        }

        info!("Outbox flusher stopped");
    }

    /// One flush pass over the due entries.
    pub async fn process_batch(&self) -> Result<(), TerminalError> {
        let outbox = self.store.outbox();
        let entries = outbox.due(self.config.batch_size, Utc::now()).await?;

        if entries.is_empty() {
            debug!("No due outbox entries");
            return Ok(());
        }

        info!(count = entries.len(), "Processing outbox batch");

        for entry in entries {
            if entry.attempts >= self.config.max_attempts {
                warn!(
                    request_id = %entry.request_id,
                    attempts = entry.attempts,
                    "Skipping entry that exceeded max delivery attempts"
                );
                continue;
            }

            self.deliver(entry).await;
        }

        Ok(())
    }

    /// Delivers one entry, recording the outcome.
    ///
    /// Delivery failures are recorded on the entry, never propagated - one
    /// bad order must not stall the queue behind it.
    async fn deliver(&self, entry: OutboxEntry) {
        let outbox = self.store.outbox();

        let request = match entry.request() {
            Ok(request) => request,
            Err(e) => {
                error!(request_id = %entry.request_id, ?e, "Abandoning undecodable entry");
                if let Err(e) = outbox.abandon(&entry.request_id, &e.to_string()).await {
                    error!(?e, "Failed to abandon outbox entry");
                }
                return;
            }
        };

        match self.post_with_inpass_retry(&request).await {
            Ok(order_id) => {
                info!(request_id = %entry.request_id, order_id = %order_id, "Outbox entry delivered");
                if let Err(e) = outbox.mark_submitted(&entry.request_id, &order_id).await {
                    error!(?e, "Failed to mark outbox entry submitted");
                }
            }
            Err(e) if e.is_retryable() => {
                let delay = backoff_delay(
                    entry.attempts,
                    self.config.backoff_base,
                    self.config.backoff_cap,
                );
                let next = Utc::now()
                    + chrono::Duration::from_std(delay)
                        .unwrap_or_else(|_| chrono::Duration::seconds(300));
                warn!(
                    request_id = %entry.request_id,
                    attempts = entry.attempts + 1,
                    retry_in_secs = delay.as_secs(),
                    "Delivery failed, will retry: {}", e
                );
                if let Err(e) = outbox.mark_failed(&entry.request_id, &e.to_string(), next).await {
                    error!(?e, "Failed to record outbox delivery failure");
                }
            }
            Err(e) => {
                warn!(request_id = %entry.request_id, "Abandoning entry after permanent failure: {}", e);
                if let Err(e) = outbox.abandon(&entry.request_id, &e.to_string()).await {
                    error!(?e, "Failed to abandon outbox entry");
                }
            }
        }
    }

    /// One POST with a short exponential-backoff retry for transient
    /// blips inside the pass. Long-horizon retries live in the outbox
    /// schedule, not here.
    async fn post_with_inpass_retry(
        &self,
        request: &vendra_core::OrderRequest,
    ) -> Result<String, ClientError> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(250))
            .with_max_elapsed_time(Some(self.config.inpass_max_elapsed))
            .build();

        let orders = self.backend.orders();

        let ack = backoff::future::retry(policy, || {
            let orders = orders.clone();
            let request = request.clone();
            async move {
                orders.create(&request).await.map_err(|e| {
                    if e.is_retryable() {
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        })
        .await?;

        Ok(ack.order_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use vendra_client::ClientConfig;
    use vendra_core::{DiscountRate, OrderRequest};
    use vendra_store::StoreConfig;

    #[test]
    fn test_backoff_delay_schedule() {
        let base = Duration::from_secs(2);
        let cap = Duration::from_secs(300);

        assert_eq!(backoff_delay(0, base, cap), Duration::from_secs(2));
        assert_eq!(backoff_delay(1, base, cap), Duration::from_secs(4));
        assert_eq!(backoff_delay(3, base, cap), Duration::from_secs(16));
        assert_eq!(backoff_delay(7, base, cap), Duration::from_secs(256));
        // Capped from here on.
        assert_eq!(backoff_delay(8, base, cap), cap);
        assert_eq!(backoff_delay(500, base, cap), cap);
        assert_eq!(backoff_delay(-3, base, cap), Duration::from_secs(2));
    }

    fn request(seq: u8) -> OrderRequest {
        OrderRequest {
            client_request_id: Uuid::parse_str(&format!(
                "00000000-0000-0000-0000-0000000000{:02x}",
                seq
            ))
            .unwrap(),
            items: Vec::new(),
            customer_id: None,
            discount: DiscountRate::zero(),
            subtotal_cents: 1000,
            tax_cents: 0,
            total_cents: 1000,
            payments: Vec::new(),
            ewallet_cents: 0,
            loyalty_points_used: 0,
            store_id: "store-001".to_string(),
            branch_id: "branch-01".to_string(),
            is_online: false,
        }
    }

    /// A backend nothing listens on: every POST is a fast connection
    /// refusal, i.e. a retryable network error.
    fn unroutable_backend() -> Backend {
        let config = ClientConfig::new("http://127.0.0.1:1")
            .unwrap()
            .with_timeout_secs(1);
        Backend::new(&config).unwrap()
    }

    fn quick_config() -> FlusherConfig {
        FlusherConfig {
            inpass_max_elapsed: Duration::from_millis(100),
            ..FlusherConfig::default()
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_schedules_retry() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        store.outbox().enqueue(&request(1)).await.unwrap();

        let (flusher, _handle) =
            OutboxFlusher::new(store.clone(), unroutable_backend(), quick_config());
        flusher.process_batch().await.unwrap();

        let entry = store
            .outbox()
            .get(&request(1).client_request_id.to_string())
            .await
            .unwrap()
            .unwrap();
        assert!(entry.is_pending());
        assert_eq!(entry.attempts, 1);
        assert!(entry.last_error.is_some());
        assert!(entry.next_attempt_at > Utc::now());
    }

    #[tokio::test]
    async fn test_maxed_out_entry_is_skipped() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        store.outbox().enqueue(&request(1)).await.unwrap();
        let rid = request(1).client_request_id.to_string();

        // Exhaust the attempt budget without going near the network.
        for _ in 0..10 {
            store
                .outbox()
                .mark_failed(&rid, "unreachable", Utc::now())
                .await
                .unwrap();
        }

        let (flusher, _handle) =
            OutboxFlusher::new(store.clone(), unroutable_backend(), quick_config());
        flusher.process_batch().await.unwrap();

        let entry = store.outbox().get(&rid).await.unwrap().unwrap();
        // Untouched: still pending, attempt count unchanged.
        assert!(entry.is_pending());
        assert_eq!(entry.attempts, 10);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_abandoned() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();

        // Inject a corrupt row behind the typed API's back.
        sqlx::query(
            r#"
            INSERT INTO order_outbox (request_id, payload, attempts, created_at, next_attempt_at)
            VALUES ('corrupt-1', 'not json', 0, ?1, ?1)
            "#,
        )
        .bind(Utc::now())
        .execute(store.pool())
        .await
        .unwrap();

        let (flusher, _handle) =
            OutboxFlusher::new(store.clone(), unroutable_backend(), quick_config());
        flusher.process_batch().await.unwrap();

        let entry = store.outbox().get("corrupt-1").await.unwrap().unwrap();
        assert!(entry.abandoned_at.is_some());
    }
}
