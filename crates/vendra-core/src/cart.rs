//! # Cart Module
//!
//! Cart lines and cart aggregation - the first two stages of the order
//! total pipeline.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Order Total Pipeline (stages 1-2)                       │
//! │                                                                         │
//! │  CartLine                                                               │
//! │    gross        = unit_price × quantity                                 │
//! │    subtotal     = gross - round(gross × line_discount)                  │
//! │    tax          = Σ round(subtotal × rate)   for each tax rate          │
//! │                   (each rate on the SAME base: additive, order-free)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cart                                                                   │
//! │    subtotal     = Σ line subtotals                                      │
//! │    tax          = Σ line taxes                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  checkout::compute_totals  (cart discount, tender - stages 3-4)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id` (adding the same product merges
//!   quantities)
//! - Quantity is clamped to ≥ 1 on every update; removal is explicit
//! - Line discount is a `DiscountRate`, valid by construction
//! - Maximum lines: 100; maximum quantity per line: 999

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountRate, Product, TaxRate};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One product entry in the in-progress sale.
///
/// ## Snapshot Pattern
/// Price, name and tax rates are copied from the product at add-time and
/// never re-fetched. The cart displays and charges what the cashier saw,
/// even if the catalog changes mid-sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Price in cents at time of adding (frozen)
    pub unit_price_cents: i64,

    /// Quantity in cart (≥ 1 always)
    pub quantity: i64,

    /// Line-level discount
    pub discount: DiscountRate,

    /// Tax rates at time of adding (frozen)
    pub tax_rates: Vec<TaxRate>,

    /// When this line was added to the cart
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a new cart line from a product and quantity.
    ///
    /// Quantity is clamped to ≥ 1.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity: quantity.max(1),
            discount: DiscountRate::zero(),
            tax_rates: product.tax_rates.clone(),
            added_at: Utc::now(),
        }
    }

    /// The undiscounted line amount (unit price × quantity).
    pub fn gross_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// The discounted line subtotal.
    pub fn subtotal_cents(&self) -> i64 {
        Money::from_cents(self.gross_cents())
            .apply_discount(self.discount)
            .cents()
    }

    /// Total tax for this line.
    ///
    /// Each rate applies to the same discounted subtotal; contributions are
    /// rounded independently and summed, so the rate list order never
    /// changes the result.
    pub fn tax_cents(&self) -> i64 {
        let base = Money::from_cents(self.subtotal_cents());
        self.tax_rates
            .iter()
            .map(|rate| base.calculate_tax(*rate))
            .sum::<Money>()
            .cents()
    }

    /// Line subtotal including tax.
    pub fn total_cents(&self) -> i64 {
        self.subtotal_cents() + self.tax_cents()
    }

    /// Sets the quantity, clamping to ≥ 1.
    ///
    /// Removal is never implicit - use [`Cart::remove_line`].
    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity.max(1);
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    /// Lines in the cart
    pub lines: Vec<CartLine>,

    /// When the cart was created/last cleared
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product to the cart or increases quantity if already present.
    ///
    /// ## Behavior
    /// - If product already in cart: merges by increasing quantity
    /// - If product not in cart: adds a new line with zero line discount
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        let quantity = quantity.max(1);

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id)
        {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Updates the quantity of a line, clamping to ≥ 1.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))?;

        line.set_quantity(quantity);
        Ok(())
    }

    /// Sets the line-level discount for a product.
    pub fn set_line_discount(
        &mut self,
        product_id: &str,
        discount: DiscountRate,
    ) -> CoreResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))?;

        line.discount = discount;
        Ok(())
    }

    /// Removes a line from the cart by product ID.
    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);

        if self.lines.len() == initial_len {
            Err(CoreError::LineNotFound(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// Returns the number of unique lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Cart subtotal: the sum of discounted line subtotals.
    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.subtotal_cents()).sum()
    }

    /// Cart tax: the sum of line taxes, before any cart-level discount.
    pub fn tax_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.tax_cents()).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
