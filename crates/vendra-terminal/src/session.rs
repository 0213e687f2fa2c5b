//! # Checkout Session
//!
//! The state machine for a single checkout, pure and I/O-free. The
//! [`crate::terminal::Terminal`] drives it; nothing in here touches the
//! network or the store.
//!
//! ## States
//! ```text
//! Idle → BuildingCart → AwaitingPayment → Submitting → Completed
//!                ▲            ▲                │
//!                │            └──── fail ──────┘
//!                └── cancel_tender
//! ```
//!
//! A failed submission is not a resting state: `fail` returns the session
//! to `AwaitingPayment` with the error recorded and the payment list AND
//! the idempotency key retained, so a retry reuses the same
//! `client_request_id` and can never create a duplicate order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vendra_core::checkout::{compute_totals, ensure_submittable};
use vendra_core::{
    Cart, CheckoutTotals, CoreError, Customer, DiscountRate, OrderRequest, PaymentEntry,
    Product, Tender,
};

use crate::error::TerminalError;

// =============================================================================
// Phase & Outcome
// =============================================================================

/// Where a checkout currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    /// No sale in progress.
    Idle,
    /// Lines are being scanned and edited.
    BuildingCart,
    /// The tender screen is open; payments accumulate.
    AwaitingPayment,
    /// One submission is in flight. Re-entrant submits are rejected here -
    /// the state machine is the duplicate-click debounce.
    Submitting,
    /// The sale ended; see [`SubmissionOutcome`].
    Completed,
}

/// How a completed checkout ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SubmissionOutcome {
    /// The backend accepted the order; the id keys the receipt view.
    Accepted {
        order_id: String,
        receipt_number: Option<String>,
    },
    /// The backend was unreachable; the order is parked in the outbox and
    /// will be delivered by the flusher under the same idempotency key.
    Queued { request_id: Uuid },
}

/// Error raised when an operation is illegal in the current phase.
#[derive(Debug, thiserror::Error)]
#[error("Cannot {operation} while {phase:?}")]
pub struct SessionError {
    pub operation: &'static str,
    pub phase: CheckoutPhase,
}

// =============================================================================
// Cart Snapshot (held orders)
// =============================================================================

/// What a held order preserves: the cart, its discount, and the customer.
///
/// Tender is deliberately NOT held - payments belong to the moment the
/// drawer is open, not to a parked cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub cart: Cart,
    pub cart_discount: DiscountRate,
    pub customer: Option<Customer>,
}

// =============================================================================
// Checkout Session
// =============================================================================

/// One checkout from first scan to receipt.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    phase: CheckoutPhase,
    cart: Cart,
    cart_discount: DiscountRate,
    customer: Option<Customer>,
    tender: Tender,
    /// Idempotency key, stamped on the first submission attempt and kept
    /// across failures.
    request_id: Option<Uuid>,
    last_error: Option<String>,
    outcome: Option<SubmissionOutcome>,
}

impl CheckoutSession {
    /// Creates an idle session.
    pub fn new() -> Self {
        CheckoutSession {
            phase: CheckoutPhase::Idle,
            cart: Cart::new(),
            cart_discount: DiscountRate::zero(),
            customer: None,
            tender: Tender::new(),
            request_id: None,
            last_error: None,
            outcome: None,
        }
    }

    // -- read access ---------------------------------------------------------

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_discount(&self) -> DiscountRate {
        self.cart_discount
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn tender(&self) -> &Tender {
        &self.tender
    }

    /// The idempotency key, once a submission has been attempted.
    pub fn request_id(&self) -> Option<Uuid> {
        self.request_id
    }

    /// The last submission error, surfaced on the tender screen.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The outcome, once Completed.
    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        self.outcome.as_ref()
    }

    /// Totals for the current cart/discount/tender. Valid in every phase;
    /// the tender screen re-renders from this after each edit.
    pub fn totals(&self) -> Result<CheckoutTotals, TerminalError> {
        Ok(compute_totals(
            &self.cart,
            self.cart_discount,
            &self.tender,
            self.customer.as_ref(),
        )?)
    }

    // -- guards --------------------------------------------------------------

    fn require(
        &self,
        operation: &'static str,
        allowed: &[CheckoutPhase],
    ) -> Result<(), TerminalError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SessionError {
                operation,
                phase: self.phase,
            }
            .into())
        }
    }

    // -- building the cart ---------------------------------------------------

    /// Adds a product (first scan starts the sale).
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> Result<(), TerminalError> {
        self.require(
            "add product",
            &[CheckoutPhase::Idle, CheckoutPhase::BuildingCart],
        )?;

        self.cart.add_product(product, quantity)?;
        self.phase = CheckoutPhase::BuildingCart;
        Ok(())
    }

    /// Updates a line quantity (clamped to ≥ 1 by the cart).
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> Result<(), TerminalError> {
        self.require("edit cart", &[CheckoutPhase::BuildingCart])?;
        self.cart.update_quantity(product_id, quantity)?;
        Ok(())
    }

    /// Sets a line-level discount.
    pub fn set_line_discount(
        &mut self,
        product_id: &str,
        discount: DiscountRate,
    ) -> Result<(), TerminalError> {
        self.require("edit cart", &[CheckoutPhase::BuildingCart])?;
        self.cart.set_line_discount(product_id, discount)?;
        Ok(())
    }

    /// Removes a line.
    pub fn remove_line(&mut self, product_id: &str) -> Result<(), TerminalError> {
        self.require("edit cart", &[CheckoutPhase::BuildingCart])?;
        self.cart.remove_line(product_id)?;
        Ok(())
    }

    /// Sets the cart-level discount.
    pub fn set_cart_discount(&mut self, discount: DiscountRate) -> Result<(), TerminalError> {
        self.require("set cart discount", &[CheckoutPhase::BuildingCart])?;
        self.cart_discount = discount;
        Ok(())
    }

    /// Attaches a customer (fresh balances feed the tender caps).
    pub fn attach_customer(&mut self, customer: Customer) -> Result<(), TerminalError> {
        self.require(
            "attach customer",
            &[
                CheckoutPhase::Idle,
                CheckoutPhase::BuildingCart,
                CheckoutPhase::AwaitingPayment,
            ],
        )?;

        self.customer = Some(customer);
        if self.phase == CheckoutPhase::Idle {
            self.phase = CheckoutPhase::BuildingCart;
        }
        Ok(())
    }

    /// Detaches the customer; balance-backed tender goes with them.
    pub fn detach_customer(&mut self) -> Result<(), TerminalError> {
        self.require(
            "detach customer",
            &[CheckoutPhase::BuildingCart, CheckoutPhase::AwaitingPayment],
        )?;

        self.customer = None;
        self.tender.loyalty_points = 0;
        self.tender.ewallet_cents = 0;
        Ok(())
    }

    // -- tender --------------------------------------------------------------

    /// Opens the tender screen.
    pub fn begin_tender(&mut self) -> Result<(), TerminalError> {
        self.require("begin tender", &[CheckoutPhase::BuildingCart])?;
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        self.phase = CheckoutPhase::AwaitingPayment;
        Ok(())
    }

    /// Closes the tender screen back to the cart, keeping what was
    /// tendered so far.
    pub fn cancel_tender(&mut self) -> Result<(), TerminalError> {
        self.require("cancel tender", &[CheckoutPhase::AwaitingPayment])?;
        self.phase = CheckoutPhase::BuildingCart;
        Ok(())
    }

    /// Adds one payment entry.
    pub fn add_payment(&mut self, entry: PaymentEntry) -> Result<(), TerminalError> {
        self.require("add payment", &[CheckoutPhase::AwaitingPayment])?;
        self.tender.add_payment(entry)?;
        Ok(())
    }

    /// Removes a payment entry by index.
    pub fn remove_payment(&mut self, index: usize) -> Result<PaymentEntry, TerminalError> {
        self.require("remove payment", &[CheckoutPhase::AwaitingPayment])?;
        self.tender
            .remove_payment(index)
            .ok_or_else(|| TerminalError::not_found("Payment entry", &index.to_string()))
    }

    /// Sets the loyalty points to redeem, enforcing the customer cap.
    pub fn set_loyalty_points(&mut self, points: i64) -> Result<(), TerminalError> {
        self.require("redeem points", &[CheckoutPhase::AwaitingPayment])?;

        let customer = self
            .customer
            .as_ref()
            .ok_or(CoreError::GuestTender {
                tender: "loyalty points",
            })?;
        if points < 0 || points > customer.loyalty_points {
            return Err(CoreError::LoyaltyExceedsBalance {
                requested: points,
                available: customer.loyalty_points,
            }
            .into());
        }

        self.tender.loyalty_points = points;
        Ok(())
    }

    /// Sets the eWallet amount to apply, enforcing the customer cap.
    pub fn set_ewallet_cents(&mut self, cents: i64) -> Result<(), TerminalError> {
        self.require("apply eWallet", &[CheckoutPhase::AwaitingPayment])?;

        let customer = self
            .customer
            .as_ref()
            .ok_or(CoreError::GuestTender { tender: "eWallet" })?;
        if cents < 0 || cents > customer.ewallet_balance_cents {
            return Err(CoreError::EwalletExceedsBalance {
                requested_cents: cents,
                available_cents: customer.ewallet_balance_cents,
            }
            .into());
        }

        self.tender.ewallet_cents = cents;
        Ok(())
    }

    // -- submission ----------------------------------------------------------

    /// Starts a submission: gates on full tender, stamps the idempotency
    /// key (reusing the one from a failed attempt), and builds the payload.
    ///
    /// Re-entrant calls while `Submitting` fail the phase guard - that is
    /// the double-click protection.
    pub fn begin_submission(
        &mut self,
        store_id: &str,
        branch_id: &str,
    ) -> Result<OrderRequest, TerminalError> {
        self.require("submit", &[CheckoutPhase::AwaitingPayment])?;

        let totals = self.totals()?;
        ensure_submittable(&self.cart, &totals)?;

        let request_id = *self.request_id.get_or_insert_with(Uuid::new_v4);

        let request = OrderRequest::build(
            request_id,
            &self.cart,
            &totals,
            &self.tender,
            self.customer.as_ref().map(|c| c.id.clone()),
            store_id,
            branch_id,
        );

        self.phase = CheckoutPhase::Submitting;
        self.last_error = None;
        Ok(request)
    }

    /// Records backend acceptance.
    pub fn complete_accepted(
        &mut self,
        order_id: String,
        receipt_number: Option<String>,
    ) -> Result<(), TerminalError> {
        self.require("complete", &[CheckoutPhase::Submitting])?;
        self.outcome = Some(SubmissionOutcome::Accepted {
            order_id,
            receipt_number,
        });
        self.phase = CheckoutPhase::Completed;
        Ok(())
    }

    /// Records that the order was parked in the outbox.
    pub fn complete_queued(&mut self) -> Result<(), TerminalError> {
        self.require("complete", &[CheckoutPhase::Submitting])?;
        let request_id = self
            .request_id
            .ok_or_else(|| TerminalError::internal("queued completion without a request id"))?;
        self.outcome = Some(SubmissionOutcome::Queued { request_id });
        self.phase = CheckoutPhase::Completed;
        Ok(())
    }

    /// Records a permanent submission failure: back to the tender screen
    /// with the error shown, payments and idempotency key retained.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TerminalError> {
        self.require("fail", &[CheckoutPhase::Submitting])?;
        self.last_error = Some(message.into());
        self.phase = CheckoutPhase::AwaitingPayment;
        Ok(())
    }

    /// Resets for the next customer. Legal everywhere except while a
    /// submission is in flight.
    pub fn new_sale(&mut self) -> Result<(), TerminalError> {
        if self.phase == CheckoutPhase::Submitting {
            return Err(SessionError {
                operation: "start a new sale",
                phase: self.phase,
            }
            .into());
        }
        *self = CheckoutSession::new();
        Ok(())
    }

    // -- holds ---------------------------------------------------------------

    /// Snapshots the sale for a held order.
    pub fn snapshot(&self) -> Result<CartSnapshot, TerminalError> {
        self.require(
            "hold order",
            &[CheckoutPhase::BuildingCart, CheckoutPhase::AwaitingPayment],
        )?;

        Ok(CartSnapshot {
            cart: self.cart.clone(),
            cart_discount: self.cart_discount,
            customer: self.customer.clone(),
        })
    }

    /// Restores a held order into an idle session.
    pub fn restore(&mut self, snapshot: CartSnapshot) -> Result<(), TerminalError> {
        self.require("resume held order", &[CheckoutPhase::Idle])?;

        self.cart = snapshot.cart;
        self.cart_discount = snapshot.cart_discount;
        self.customer = snapshot.customer;
        self.phase = CheckoutPhase::BuildingCart;
        Ok(())
    }
}

impl Default for CheckoutSession {
    fn default() -> Self {
        CheckoutSession::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use vendra_core::types::TaxRate;

    fn product(id: &str, price_cents: i64, tax_bps: &[u32]) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            barcode: None,
            price_cents,
            original_price_cents: None,
            stock: 100,
            is_weighted: false,
            tax_rates: tax_bps.iter().map(|b| TaxRate::from_bps(*b)).collect(),
            is_active: true,
        }
    }

    fn customer(points: i64, ewallet_cents: i64) -> Customer {
        Customer {
            id: "c-1".to_string(),
            name: "Ada".to_string(),
            barcode: None,
            loyalty_points: points,
            ewallet_balance_cents: ewallet_cents,
        }
    }

    fn cash(amount_cents: i64) -> PaymentEntry {
        PaymentEntry {
            method_id: "pm-cash".to_string(),
            method_name: "Cash".to_string(),
            amount_cents,
        }
    }

    /// Walks a session to AwaitingPayment with a 1890-cent balance due.
    fn at_tender() -> CheckoutSession {
        let mut session = CheckoutSession::new();
        session.add_product(&product("p-1", 1000, &[500]), 2).unwrap();
        session
            .set_line_discount("p-1", DiscountRate::from_percent(10.0))
            .unwrap();
        session.begin_tender().unwrap();
        session
    }

    #[test]
    fn test_happy_path_accepted() {
        let mut session = at_tender();
        assert_eq!(session.phase(), CheckoutPhase::AwaitingPayment);
        assert_eq!(session.totals().unwrap().total_cents, 1890);

        session.add_payment(cash(1890)).unwrap();
        let request = session.begin_submission("store-001", "branch-01").unwrap();
        assert_eq!(session.phase(), CheckoutPhase::Submitting);
        assert_eq!(request.total_cents, 1890);
        assert_eq!(request.items.len(), 1);

        session
            .complete_accepted("o-42".to_string(), None)
            .unwrap();
        assert_eq!(session.phase(), CheckoutPhase::Completed);
        assert!(matches!(
            session.outcome(),
            Some(SubmissionOutcome::Accepted { order_id, .. }) if order_id == "o-42"
        ));

        session.new_sale().unwrap();
        assert_eq!(session.phase(), CheckoutPhase::Idle);
        assert!(session.cart().is_empty());
        assert!(session.request_id().is_none());
    }

    #[test]
    fn test_submit_blocked_until_settled() {
        let mut session = at_tender();
        session.add_payment(cash(1500)).unwrap();

        let err = session
            .begin_submission("store-001", "branch-01")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        // Still at the tender screen, payment retained.
        assert_eq!(session.phase(), CheckoutPhase::AwaitingPayment);
        assert_eq!(session.tender().payments_cents(), 1500);
    }

    /// Failed submission keeps the payments AND the idempotency key, so a
    /// retry sends the same `client_request_id`.
    #[test]
    fn test_failure_retains_tender_and_request_id() {
        let mut session = at_tender();
        session.add_payment(cash(1890)).unwrap();

        let first = session.begin_submission("store-001", "branch-01").unwrap();
        session.fail("server said no").unwrap();

        assert_eq!(session.phase(), CheckoutPhase::AwaitingPayment);
        assert_eq!(session.last_error(), Some("server said no"));
        assert_eq!(session.tender().payments_cents(), 1890);

        let second = session.begin_submission("store-001", "branch-01").unwrap();
        assert_eq!(second.client_request_id, first.client_request_id);
    }

    #[test]
    fn test_reentrant_submit_rejected() {
        let mut session = at_tender();
        session.add_payment(cash(1890)).unwrap();
        session.begin_submission("store-001", "branch-01").unwrap();

        let err = session
            .begin_submission("store-001", "branch-01")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPhase);
    }

    #[test]
    fn test_queued_outcome_carries_request_id() {
        let mut session = at_tender();
        session.add_payment(cash(1890)).unwrap();
        let request = session.begin_submission("store-001", "branch-01").unwrap();

        session.complete_queued().unwrap();
        assert!(matches!(
            session.outcome(),
            Some(SubmissionOutcome::Queued { request_id }) if *request_id == request.client_request_id
        ));
    }

    #[test]
    fn test_cart_edits_only_while_building() {
        let mut session = at_tender();

        let err = session.update_quantity("p-1", 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPhase);

        session.cancel_tender().unwrap();
        session.update_quantity("p-1", 3).unwrap();
        assert_eq!(session.cart().total_quantity(), 3);
    }

    #[test]
    fn test_begin_tender_requires_lines() {
        let mut session = CheckoutSession::new();
        session.add_product(&product("p-1", 500, &[]), 1).unwrap();
        session.remove_line("p-1").unwrap();

        let err = session.begin_tender().unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[test]
    fn test_loyalty_and_ewallet_caps() {
        let mut session = at_tender();
        session.attach_customer(customer(500, 2500)).unwrap();

        session.set_loyalty_points(200).unwrap();
        assert_eq!(session.totals().unwrap().loyalty_value_cents, 200);

        let err = session.set_loyalty_points(700).unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        // The previous, legal value is untouched.
        assert_eq!(session.tender().loyalty_points, 200);

        session.set_ewallet_cents(2500).unwrap();
        let err = session.set_ewallet_cents(2501).unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
    }

    #[test]
    fn test_guest_cannot_redeem() {
        let mut session = at_tender();
        let err = session.set_loyalty_points(10).unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
    }

    #[test]
    fn test_detach_customer_drops_balance_tender() {
        let mut session = at_tender();
        session.attach_customer(customer(500, 2500)).unwrap();
        session.set_loyalty_points(100).unwrap();
        session.set_ewallet_cents(200).unwrap();

        session.detach_customer().unwrap();
        assert_eq!(session.tender().loyalty_points, 0);
        assert_eq!(session.tender().ewallet_cents, 0);
    }

    #[test]
    fn test_hold_and_resume_round_trip() {
        let mut session = CheckoutSession::new();
        session.add_product(&product("p-1", 1000, &[500]), 2).unwrap();
        session.set_cart_discount(DiscountRate::from_percent(5.0)).unwrap();
        session.attach_customer(customer(50, 0)).unwrap();

        let snapshot = session.snapshot().unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        session.new_sale().unwrap();

        let restored: CartSnapshot = serde_json::from_str(&json).unwrap();
        session.restore(restored).unwrap();

        assert_eq!(session.phase(), CheckoutPhase::BuildingCart);
        assert_eq!(session.cart().total_quantity(), 2);
        assert_eq!(session.cart_discount().bps(), 500);
        assert_eq!(session.customer().unwrap().id, "c-1");
    }

    #[test]
    fn test_new_sale_blocked_while_submitting() {
        let mut session = at_tender();
        session.add_payment(cash(1890)).unwrap();
        session.begin_submission("store-001", "branch-01").unwrap();

        let err = session.new_sale().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPhase);
    }

    #[test]
    fn test_attach_customer_starts_a_sale() {
        let mut session = CheckoutSession::new();
        session.attach_customer(customer(0, 0)).unwrap();
        assert_eq!(session.phase(), CheckoutPhase::BuildingCart);
    }
}
