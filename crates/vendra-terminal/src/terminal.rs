//! # Terminal
//!
//! The orchestration layer: wires the checkout session to the backend
//! client and the lane store, and owns the submission path.
//!
//! ## Submission Path
//! ```text
//! submit()
//!   │  begin_submission: gate, stamp idempotency key, build payload
//!   ▼
//! POST /orders ──── accepted ────► Completed(Accepted { order_id })
//!   │
//!   ├── retryable error (offline, timeout, 5xx)
//!   │        └► outbox.enqueue(payload)  ► Completed(Queued)  ► kick flusher
//!   │
//!   └── permanent error (4xx)
//!            └► fail(message)  ► AwaitingPayment, error shown, tender kept
//! ```

use tracing::{info, warn};

use vendra_client::{
    Backend, OrderReceipt, SessionMonitor, SessionMonitorHandle,
};
use vendra_core::validation::validate_hold_label;
use vendra_core::{CoreError, PaymentMethod};
use vendra_store::{HeldOrder, Store};

use crate::config::TerminalConfig;
use crate::error::TerminalError;
use crate::flusher::{OutboxFlusher, OutboxFlusherHandle};
use crate::session::{CartSnapshot, CheckoutPhase, SubmissionOutcome};
use crate::state::TerminalState;

/// One cashier lane.
pub struct Terminal {
    config: TerminalConfig,
    state: TerminalState,
    backend: Backend,
    store: Store,
    flusher: Option<OutboxFlusherHandle>,
}

impl Terminal {
    /// Builds a lane from configuration: backend client + local store.
    pub async fn new(config: TerminalConfig) -> Result<Self, TerminalError> {
        let backend = Backend::new(&config.client_config()?)?;
        let store = Store::new(config.store_config()?).await?;

        Ok(Terminal::with_parts(config, backend, store))
    }

    /// Assembles a lane from pre-built parts (tests, custom wiring).
    pub fn with_parts(config: TerminalConfig, backend: Backend, store: Store) -> Self {
        Terminal {
            config,
            state: TerminalState::new(),
            backend,
            store,
            flusher: None,
        }
    }

    /// The shared session state (for UI bindings).
    pub fn state(&self) -> &TerminalState {
        &self.state
    }

    /// The backend facade (for flows outside the checkout core).
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    // -- background tasks ----------------------------------------------------

    /// Spawns the outbox flusher and keeps its handle for kicks.
    pub fn spawn_flusher(&mut self) -> OutboxFlusherHandle {
        let (flusher, handle) = OutboxFlusher::new(
            self.store.clone(),
            self.backend.clone(),
            self.config.flusher_config(),
        );
        tokio::spawn(flusher.run());
        self.flusher = Some(handle.clone());
        handle
    }

    /// Spawns the session monitor and returns its handle.
    ///
    /// The terminal only *observes* expiry; cart state survives it.
    pub fn spawn_session_monitor(&self) -> SessionMonitorHandle {
        let (monitor, handle) = SessionMonitor::new(
            self.backend.http().clone(),
            self.config.probe_interval(),
        );
        tokio::spawn(monitor.run());
        handle
    }

    // -- catalog & customers -------------------------------------------------

    /// Scans a product into the cart.
    pub async fn scan_product(&self, barcode: &str, quantity: i64) -> Result<(), TerminalError> {
        let product = self.backend.products().by_barcode(barcode).await?;
        self.state
            .with_session_mut(|s| s.add_product(&product, quantity))
    }

    /// Attaches a customer by membership barcode.
    pub async fn attach_customer_by_barcode(&self, barcode: &str) -> Result<(), TerminalError> {
        let customer = self.backend.customers().by_barcode(barcode).await?;
        self.state.with_session_mut(|s| s.attach_customer(customer))
    }

    /// Attaches a customer by id, refreshing balances first.
    pub async fn attach_customer(&self, customer_id: &str) -> Result<(), TerminalError> {
        let customer = self.backend.customers().by_id(customer_id).await?;
        self.state.with_session_mut(|s| s.attach_customer(customer))
    }

    /// The store's tender types.
    pub async fn payment_methods(&self) -> Result<Vec<PaymentMethod>, TerminalError> {
        Ok(self.backend.orders().payment_methods().await?)
    }

    // -- submission ----------------------------------------------------------

    /// Submits the current checkout.
    ///
    /// Exactly one of three things happens:
    /// - the backend accepts → `Accepted` with the order id
    /// - a retryable failure → the payload is durably queued, `Queued`
    /// - a permanent failure → back to the tender screen, error returned
    pub async fn submit(&self) -> Result<SubmissionOutcome, TerminalError> {
        let request = self.state.with_session_mut(|s| {
            s.begin_submission(&self.config.store.id, &self.config.store.branch_id)
        })?;

        info!(
            request_id = %request.client_request_id,
            total = request.total_cents,
            items = request.items.len(),
            "Submitting order"
        );

        match self.backend.orders().create(&request).await {
            Ok(ack) => {
                info!(order_id = %ack.order_id, "Order accepted");
                self.state.with_session_mut(|s| {
                    s.complete_accepted(ack.order_id.clone(), ack.receipt_number.clone())
                })?;
                Ok(SubmissionOutcome::Accepted {
                    order_id: ack.order_id,
                    receipt_number: ack.receipt_number,
                })
            }

            Err(e) if e.is_retryable() => {
                warn!(
                    request_id = %request.client_request_id,
                    "Backend unreachable, queueing order: {}", e
                );

                if let Err(store_err) = self.store.outbox().enqueue(&request).await {
                    // Nowhere durable to put it: the submission has failed
                    // outright and the operator keeps the tender screen.
                    self.state
                        .with_session_mut(|s| s.fail(store_err.to_string()))?;
                    return Err(store_err.into());
                }

                self.state.with_session_mut(|s| s.complete_queued())?;
                if let Some(flusher) = &self.flusher {
                    flusher.kick();
                }
                Ok(SubmissionOutcome::Queued {
                    request_id: request.client_request_id,
                })
            }

            Err(e) => {
                warn!(request_id = %request.client_request_id, "Order rejected: {}", e);
                self.state.with_session_mut(|s| s.fail(e.to_string()))?;
                Err(e.into())
            }
        }
    }

    /// Fetches a stored order for the receipt view.
    pub async fn receipt(&self, order_id: &str) -> Result<OrderReceipt, TerminalError> {
        Ok(self.backend.orders().by_id(order_id).await?)
    }

    /// Orders still waiting in the outbox (UI badge).
    pub async fn pending_submissions(&self) -> Result<i64, TerminalError> {
        Ok(self.store.outbox().pending_count().await?)
    }

    // -- held orders ---------------------------------------------------------

    /// Parks the in-progress sale and resets the lane.
    pub async fn hold(&self, label: &str) -> Result<HeldOrder, TerminalError> {
        let label = validate_hold_label(label).map_err(CoreError::Validation)?;
        let snapshot = self.state.with_session(|s| s.snapshot())?;
        let json = serde_json::to_string(&snapshot)
            .map_err(|e| TerminalError::internal(e.to_string()))?;

        let held = self.store.holds().hold(&label, &json).await?;
        self.state.with_session_mut(|s| s.new_sale())?;

        info!(hold_id = %held.id, "Sale held");
        Ok(held)
    }

    /// Lists parked sales.
    pub async fn list_holds(&self) -> Result<Vec<HeldOrder>, TerminalError> {
        Ok(self.store.holds().list().await?)
    }

    /// Resumes a parked sale into the (idle) lane.
    pub async fn resume(&self, hold_id: &str) -> Result<(), TerminalError> {
        // Check the phase BEFORE taking the hold, so a hold is never
        // consumed by a lane that cannot restore it.
        let phase = self.state.with_session(|s| s.phase());
        if phase != CheckoutPhase::Idle {
            return Err(crate::session::SessionError {
                operation: "resume held order",
                phase,
            }
            .into());
        }

        let held = self
            .store
            .holds()
            .take(hold_id)
            .await?
            .ok_or_else(|| TerminalError::not_found("Held order", hold_id))?;

        let snapshot: CartSnapshot = serde_json::from_str(&held.snapshot).map_err(|e| {
            TerminalError::internal(format!("corrupt hold snapshot {}: {}", hold_id, e))
        })?;

        self.state.with_session_mut(|s| s.restore(snapshot))?;
        info!(hold_id = %hold_id, "Sale resumed");
        Ok(())
    }

    /// Discards a parked sale.
    pub async fn discard_hold(&self, hold_id: &str) -> Result<(), TerminalError> {
        if !self.store.holds().discard(hold_id).await? {
            return Err(TerminalError::not_found("Held order", hold_id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use vendra_client::ClientConfig;
    use vendra_core::types::TaxRate;
    use vendra_core::Product;
    use vendra_store::StoreConfig;

    async fn offline_terminal() -> Terminal {
        let config = TerminalConfig::default();
        let backend = Backend::new(
            &ClientConfig::new("http://127.0.0.1:1")
                .unwrap()
                .with_timeout_secs(1),
        )
        .unwrap();
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        Terminal::with_parts(config, backend, store)
    }

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            barcode: None,
            price_cents,
            original_price_cents: None,
            stock: 100,
            is_weighted: false,
            tax_rates: vec![TaxRate::from_bps(500)],
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_hold_resume_cycle() {
        let terminal = offline_terminal().await;

        terminal
            .state()
            .with_session_mut(|s| s.add_product(&product("p-1", 1000), 2))
            .unwrap();

        let held = terminal.hold("table 4").await.unwrap();
        assert_eq!(held.label, "table 4");
        assert_eq!(
            terminal.state().with_session(|s| s.phase()),
            CheckoutPhase::Idle
        );

        assert_eq!(terminal.list_holds().await.unwrap().len(), 1);

        terminal.resume(&held.id).await.unwrap();
        assert_eq!(
            terminal.state().with_session(|s| s.phase()),
            CheckoutPhase::BuildingCart
        );
        assert_eq!(
            terminal.state().with_session(|s| s.cart().total_quantity()),
            2
        );

        // The hold is consumed.
        assert!(terminal.list_holds().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resume_requires_idle_lane_and_keeps_hold() {
        let terminal = offline_terminal().await;

        terminal
            .state()
            .with_session_mut(|s| s.add_product(&product("p-1", 1000), 1))
            .unwrap();
        let held = terminal.hold("").await.unwrap();

        // Start another sale, then try to resume over it.
        terminal
            .state()
            .with_session_mut(|s| s.add_product(&product("p-2", 500), 1))
            .unwrap();

        let err = terminal.resume(&held.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPhase);
        // The hold survived the refused resume.
        assert_eq!(terminal.list_holds().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_discard_hold() {
        let terminal = offline_terminal().await;

        terminal
            .state()
            .with_session_mut(|s| s.add_product(&product("p-1", 1000), 1))
            .unwrap();
        let held = terminal.hold("").await.unwrap();

        terminal.discard_hold(&held.id).await.unwrap();
        let err = terminal.discard_hold(&held.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    /// With the backend unreachable, a settled checkout lands in the
    /// outbox and completes as Queued - the sale is never lost.
    #[tokio::test]
    async fn test_submit_queues_when_offline() {
        let terminal = offline_terminal().await;

        terminal
            .state()
            .with_session_mut(|s| {
                s.add_product(&product("p-1", 1000), 2)?;
                s.begin_tender()?;
                s.add_payment(vendra_core::PaymentEntry {
                    method_id: "pm-cash".to_string(),
                    method_name: "Cash".to_string(),
                    amount_cents: 2100, // 2000 + 5% tax
                })
            })
            .unwrap();

        let outcome = terminal.submit().await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Queued { .. }));
        assert_eq!(terminal.pending_submissions().await.unwrap(), 1);
        assert_eq!(
            terminal.state().with_session(|s| s.phase()),
            CheckoutPhase::Completed
        );
    }
}
