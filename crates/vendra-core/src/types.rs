//! # Domain Types
//!
//! Core domain types used throughout Vendra POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Customer     │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id             │       │
//! │  │  barcode        │   │  loyalty_points │   │  name           │       │
//! │  │  price_cents    │   │  ewallet_cents  │   │  kind           │       │
//! │  │  tax_rates[]    │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    TaxRate      │   │  DiscountRate   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  bps (u32)      │   │  bps (u32)      │                             │
//! │  │  825 = 8.25%    │   │  clamped ≤10000 │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog data (Product, Customer, PaymentMethod) is sourced from the
//! backend; these structs are the transient client-side copies. Cart lines
//! snapshot what they need from them at add-time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25%
///
/// A product may carry SEVERAL tax rates (e.g. state + city). Each rate is
/// applied independently to the same discounted base and the contributions
/// are summed - additive, never compounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percent(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount rate in basis points, clamped to [0, 10000].
///
/// ## Clamping Invariant
/// Line and cart discounts are percentages in [0, 100]; the constructors
/// clamp rather than error so every stored rate is valid by construction.
/// A `DiscountRate` can therefore never discount below zero or above 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

/// Full discount: 100% = 10000 bps.
const MAX_DISCOUNT_BPS: u32 = 10_000;

impl DiscountRate {
    /// Creates a discount rate from basis points, clamping to 10000.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > MAX_DISCOUNT_BPS {
            DiscountRate(MAX_DISCOUNT_BPS)
        } else {
            DiscountRate(bps)
        }
    }

    /// Creates a discount rate from a percentage, clamping to [0, 100].
    pub fn from_percent(pct: f64) -> Self {
        let clamped = pct.clamp(0.0, 100.0);
        DiscountRate((clamped * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Checks if discount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// The backend owns the catalog; this is the client-side copy a scan or
/// search returns. `original_price_cents` is the cost basis used only by
/// server-side reporting and is carried opaquely.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Cost basis in cents (for server-side margin reporting).
    pub original_price_cents: Option<i64>,

    /// Current stock level.
    pub stock: i64,

    /// Whether the product is sold by weight.
    /// Cart quantities stay integers; a weighed item is priced per
    /// pack/unit at add-time.
    pub is_weighted: bool,

    /// Tax rates applied to this product, in basis points.
    /// Applied independently and summed (additive, not compounding).
    pub tax_rates: Vec<TaxRate>,

    /// Whether product is active (soft delete).
    pub is_active: bool,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if the requested quantity is available.
    /// Stock here is advisory; the server re-checks on order submission.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && self.stock >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with loyalty and stored-value balances.
///
/// Absence of a customer on a checkout means a "guest" sale; guests cannot
/// redeem loyalty points or pay from an eWallet.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Membership card barcode, if issued.
    pub barcode: Option<String>,

    /// Redeemable loyalty point balance (non-negative).
    pub loyalty_points: i64,

    /// Stored-value balance in cents (non-negative).
    pub ewallet_balance_cents: i64,
}

impl Customer {
    /// Returns the eWallet balance as Money.
    #[inline]
    pub fn ewallet_balance(&self) -> Money {
        Money::from_cents(self.ewallet_balance_cents)
    }

    /// Caps a requested point redemption at the available balance.
    ///
    /// The cap is a client-side convenience; the server performs the
    /// authoritative deduction and re-validates.
    #[inline]
    pub fn cap_points(&self, requested: i64) -> i64 {
        requested.clamp(0, self.loyalty_points.max(0))
    }

    /// Caps a requested eWallet amount at the available balance.
    #[inline]
    pub fn cap_ewallet_cents(&self, requested: i64) -> i64 {
        requested.clamp(0, self.ewallet_balance_cents.max(0))
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// Broad classification of a tender type.
///
/// The backend enumerates the concrete methods; the kind hint is what the
/// lane needs locally (cash-like tender produces drawer change).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TenderKind {
    /// Physical cash - change is returned from the drawer.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Anything else (vouchers, bank transfer, ...).
    Other,
}

impl Default for TenderKind {
    fn default() -> Self {
        TenderKind::Other
    }
}

/// A tender type as enumerated by `GET /payment-methods`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentMethod {
    /// Unique identifier.
    pub id: String,

    /// Display name ("Cash", "Visa terminal", ...).
    pub name: String,

    /// Broad classification.
    #[serde(default)]
    pub kind: TenderKind,
}

// =============================================================================
// Payment Entry
// =============================================================================

/// One instance of the customer paying with a specific method and amount.
///
/// A sale may carry multiple entries, and entries are independent - paying
/// twice with the same method is two entries, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentEntry {
    /// The selected payment method id.
    pub method_id: String,

    /// Method name at time of tender (frozen for the receipt).
    pub method_name: String,

    /// Amount tendered in cents (always > 0).
    pub amount_cents: i64,
}

impl PaymentEntry {
    /// Returns the tendered amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percent() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percent() {
        let rate = TaxRate::from_percent(8.25);
        assert_eq!(rate.bps(), 825);
    }

    #[test]
    fn test_discount_rate_clamps_high() {
        assert_eq!(DiscountRate::from_bps(12_000).bps(), 10_000);
        assert_eq!(DiscountRate::from_percent(150.0).bps(), 10_000);
    }

    #[test]
    fn test_discount_rate_clamps_negative_percent() {
        assert_eq!(DiscountRate::from_percent(-5.0).bps(), 0);
    }

    #[test]
    fn test_customer_caps() {
        let customer = Customer {
            id: "c-1".to_string(),
            name: "Ada".to_string(),
            barcode: None,
            loyalty_points: 500,
            ewallet_balance_cents: 2500,
        };

        assert_eq!(customer.cap_points(200), 200);
        assert_eq!(customer.cap_points(900), 500);
        assert_eq!(customer.cap_points(-10), 0);
        assert_eq!(customer.cap_ewallet_cents(3000), 2500);
    }

    #[test]
    fn test_product_can_sell() {
        let product = Product {
            id: "p-1".to_string(),
            name: "Cola 330ml".to_string(),
            barcode: Some("5449000000996".to_string()),
            price_cents: 250,
            original_price_cents: Some(180),
            stock: 3,
            is_weighted: false,
            tax_rates: vec![TaxRate::from_bps(500)],
            is_active: true,
        };

        assert!(product.can_sell(3));
        assert!(!product.can_sell(4));
    }
}
