//! # vendra-core: Pure Business Logic for Vendra POS
//!
//! This crate is the **heart** of Vendra POS. It contains the consolidated
//! order-total calculation model as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vendra POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Cashier Frontend (SPA)                       │   │
//! │  │    Scan UI ──► Cart UI ──► Tender UI ──► Receipt UI            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vendra-terminal                              │   │
//! │  │    checkout session, submission, outbox flusher                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vendra-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ checkout  │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │  Tender   │  │   │
//! │  │   │  Customer │  │  TaxRate  │  │ CartLine  │  │  Totals   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, PaymentMethod, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart lines and cart aggregation
//! - [`checkout`] - The one order-total formula + tender allocation
//! - [`order`] - Outbound order payload with idempotency key
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **One Formula**: The original app computed totals three different ways;
//!    here there is exactly one, pinned by unit tests
//!
//! ## Example Usage
//!
//! ```rust
//! use vendra_core::money::Money;
//! use vendra_core::types::TaxRate;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(1099); // 10.99
//!
//! // Calculate tax in basis points
//! let tax_rate = TaxRate::from_bps(500); // 5%
//! let tax = price.calculate_tax(tax_rate);
//! assert_eq!(tax.cents(), 55);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vendra_core::Money` instead of
// `use vendra_core::money::Money`

pub use cart::{Cart, CartLine};
pub use checkout::{CheckoutTotals, Tender};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{OrderItem, OrderRequest};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Value of one loyalty point in cents.
///
/// ## Why a constant?
/// The conversion rate (0.01 currency units per point, i.e. exactly one
/// cent) is fixed program-wide. Making it a named constant keeps the
/// redemption math and its tests honest about where the number comes from.
pub const LOYALTY_POINT_VALUE_CENTS: i64 = 1;

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
/// Can be made configurable per-store in future versions.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in the cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
