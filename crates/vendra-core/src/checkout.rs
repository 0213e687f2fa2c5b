//! # Checkout Module
//!
//! The consolidated order-total formula and tender allocation - stages 3-4
//! of the pipeline started in [`crate::cart`].
//!
//! ## One Formula
//! The original application computed "total" three different ways in three
//! components; one of them dropped tax entirely. This module is the single
//! replacement for all of them:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      compute_totals                                     │
//! │                                                                         │
//! │  subtotal   = Σ discounted line subtotals            (cart.rs)          │
//! │  tax        = Σ line taxes                           (cart.rs)          │
//! │                                                                         │
//! │  discounted_subtotal = subtotal - round(subtotal × cart_discount)       │
//! │  discounted_tax      = tax      - round(tax      × cart_discount)       │
//! │  total               = discounted_subtotal + discounted_tax             │
//! │                                                                         │
//! │  tendered    = Σ payments + ewallet + loyalty_points × 1¢               │
//! │  balance_due = max(0, total - tendered)                                 │
//! │  change      = max(0, tendered - total)                                 │
//! │                                                                         │
//! │  submit allowed ⇔ cart non-empty ∧ balance_due == 0                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tax term is always present and is scaled by the cart-level discount
//! alongside the subtotal (the cashier-flow formula). A cart discount of
//! zero is an exact identity.
//!
//! ## Caps
//! Loyalty points and eWallet amounts are capped by the customer's
//! balances. Exceeding a cap here is an error, not a silent clamp - the
//! clamping convenience lives in [`crate::types::Customer::cap_points`] and
//! friends, where the UI can apply it before asking for totals. Either
//! way, the server re-validates; these checks only gate the UI.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Customer, DiscountRate, PaymentEntry};
use crate::validation::validate_payment_amount;
use crate::LOYALTY_POINT_VALUE_CENTS;

// =============================================================================
// Tender
// =============================================================================

/// Everything the customer has put toward the sale so far.
///
/// Payment entries are independent; adding cash twice is two entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Tender {
    /// Tendered payments, in the order they were added.
    pub payments: Vec<PaymentEntry>,

    /// Stored-value amount applied from the customer's eWallet.
    pub ewallet_cents: i64,

    /// Loyalty points being redeemed.
    pub loyalty_points: i64,
}

impl Tender {
    /// Creates an empty tender.
    pub fn new() -> Self {
        Tender::default()
    }

    /// Adds a payment entry after validating it.
    ///
    /// ## Rules
    /// - A method must be selected
    /// - The amount must be positive
    pub fn add_payment(&mut self, entry: PaymentEntry) -> CoreResult<()> {
        if entry.method_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "payment method".to_string(),
            }
            .into());
        }
        validate_payment_amount(entry.amount_cents)?;

        self.payments.push(entry);
        Ok(())
    }

    /// Removes the payment entry at `index`, returning it.
    pub fn remove_payment(&mut self, index: usize) -> Option<PaymentEntry> {
        if index < self.payments.len() {
            Some(self.payments.remove(index))
        } else {
            None
        }
    }

    /// Sum of tendered payment entries in cents.
    pub fn payments_cents(&self) -> i64 {
        self.payments.iter().map(|p| p.amount_cents).sum()
    }

    /// The currency value of the redeemed loyalty points.
    pub fn loyalty_value_cents(&self) -> i64 {
        self.loyalty_points * LOYALTY_POINT_VALUE_CENTS
    }

    /// Everything tendered: payments + eWallet + loyalty value.
    pub fn credit_cents(&self) -> i64 {
        self.payments_cents() + self.ewallet_cents + self.loyalty_value_cents()
    }

    /// True when nothing has been tendered yet.
    pub fn is_empty(&self) -> bool {
        self.payments.is_empty() && self.ewallet_cents == 0 && self.loyalty_points == 0
    }

    /// Clears all tender (used when checkout is cancelled back to the cart).
    pub fn clear(&mut self) {
        self.payments.clear();
        self.ewallet_cents = 0;
        self.loyalty_points = 0;
    }
}

// =============================================================================
// Checkout Totals
// =============================================================================

/// The fully-computed totals for an in-progress checkout.
///
/// Everything the tender screen shows comes from this one struct; nothing
/// downstream re-derives a number from raw cart state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutTotals {
    /// Cart subtotal after line discounts, before the cart discount.
    pub subtotal_cents: i64,

    /// The cart-level discount rate.
    pub discount: DiscountRate,

    /// Amount taken off the subtotal by the cart discount.
    pub discount_cents: i64,

    /// Tax total after the cart discount has been applied to it.
    pub tax_cents: i64,

    /// Grand total: discounted subtotal + discounted tax.
    pub total_cents: i64,

    /// Sum of tendered payment entries.
    pub payments_cents: i64,

    /// eWallet amount applied.
    pub ewallet_cents: i64,

    /// Loyalty points redeemed.
    pub loyalty_points: i64,

    /// Currency value of the redeemed points.
    pub loyalty_value_cents: i64,

    /// Everything tendered.
    pub tendered_cents: i64,

    /// What is still owed. Zero when fully tendered.
    pub balance_due_cents: i64,

    /// Drawer change owed back to the customer when overpaid.
    pub change_cents: i64,
}

impl CheckoutTotals {
    /// True when the sale is fully tendered.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.balance_due_cents == 0
    }
}

// =============================================================================
// The Formula
// =============================================================================

/// Computes the totals for a cart, cart-level discount, and tender.
///
/// This is THE order-total function. It is total over valid inputs and
/// errors only on tender that violates a business rule:
/// - loyalty points or eWallet on a guest checkout
/// - negative loyalty points or eWallet amounts
/// - redemption above the customer's balances
///
/// An empty cart yields all-zero totals (the tender screen renders from
/// the same code path); [`ensure_submittable`] is the submission gate.
pub fn compute_totals(
    cart: &Cart,
    cart_discount: DiscountRate,
    tender: &Tender,
    customer: Option<&Customer>,
) -> CoreResult<CheckoutTotals> {
    if tender.loyalty_points < 0 {
        return Err(ValidationError::MustBePositive {
            field: "loyalty points".to_string(),
        }
        .into());
    }
    if tender.ewallet_cents < 0 {
        return Err(ValidationError::MustBePositive {
            field: "eWallet amount".to_string(),
        }
        .into());
    }

    match customer {
        Some(customer) => {
            if tender.loyalty_points > customer.loyalty_points {
                return Err(CoreError::LoyaltyExceedsBalance {
                    requested: tender.loyalty_points,
                    available: customer.loyalty_points,
                });
            }
            if tender.ewallet_cents > customer.ewallet_balance_cents {
                return Err(CoreError::EwalletExceedsBalance {
                    requested_cents: tender.ewallet_cents,
                    available_cents: customer.ewallet_balance_cents,
                });
            }
        }
        None => {
            if tender.loyalty_points > 0 {
                return Err(CoreError::GuestTender {
                    tender: "loyalty points",
                });
            }
            if tender.ewallet_cents > 0 {
                return Err(CoreError::GuestTender { tender: "eWallet" });
            }
        }
    }

    let subtotal = Money::from_cents(cart.subtotal_cents());
    let tax = Money::from_cents(cart.tax_cents());

    let discount_amount = subtotal.discount_amount(cart_discount);
    let discounted_subtotal = subtotal - discount_amount;
    let discounted_tax = tax.apply_discount(cart_discount);
    let total = discounted_subtotal + discounted_tax;

    let tendered = tender.credit_cents();
    let balance_due = (total.cents() - tendered).max(0);
    let change = (tendered - total.cents()).max(0);

    Ok(CheckoutTotals {
        subtotal_cents: subtotal.cents(),
        discount: cart_discount,
        discount_cents: discount_amount.cents(),
        tax_cents: discounted_tax.cents(),
        total_cents: total.cents(),
        payments_cents: tender.payments_cents(),
        ewallet_cents: tender.ewallet_cents,
        loyalty_points: tender.loyalty_points,
        loyalty_value_cents: tender.loyalty_value_cents(),
        tendered_cents: tendered,
        balance_due_cents: balance_due,
        change_cents: change,
    })
}

/// The submission gate: errors unless the cart has lines and the sale is
/// fully tendered.
pub fn ensure_submittable(cart: &Cart, totals: &CheckoutTotals) -> CoreResult<()> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    if !totals.is_settled() {
        return Err(CoreError::InsufficientTender {
            total_cents: totals.total_cents,
            tendered_cents: totals.tendered_cents,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
