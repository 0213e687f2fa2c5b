//! # Error Types
//!
//! Domain-specific error types for vendra-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vendra-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vendra-store errors (separate crate)                                  │
//! │  └── StoreError       - Local database failures                        │
//! │                                                                         │
//! │  vendra-client errors (separate crate)                                 │
//! │  └── ClientError      - HTTP/backend failures                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → TerminalError → UI shell          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, amounts, limits)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations caught before any
/// network call is made.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The cart has no line for the given product.
    #[error("Product not in cart: {0}")]
    LineNotFound(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Loyalty points or eWallet applied on a guest checkout.
    ///
    /// ## When This Occurs
    /// No customer is attached to the sale, but the tender carries
    /// points or a stored-value amount. Balance-backed tender always
    /// requires a customer record.
    #[error("{tender} requires an attached customer")]
    GuestTender { tender: &'static str },

    /// Requested point redemption exceeds the customer's balance.
    #[error("Cannot redeem {requested} points: only {available} available")]
    LoyaltyExceedsBalance { requested: i64, available: i64 },

    /// Requested eWallet amount exceeds the customer's balance.
    #[error("Cannot apply {requested_cents} cents from eWallet: only {available_cents} available")]
    EwalletExceedsBalance {
        requested_cents: i64,
        available_cents: i64,
    },

    /// Checkout attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Checkout attempted before the sale is fully tendered.
    #[error("Insufficient tender: {tendered_cents} of {total_cents} cents covered")]
    InsufficientTender {
        total_cents: i64,
        tendered_cents: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::LoyaltyExceedsBalance {
            requested: 700,
            available: 500,
        };
        assert_eq!(
            err.to_string(),
            "Cannot redeem 700 points: only 500 available"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        assert_eq!(err.to_string(), "barcode is required");

        let err = ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        };
        assert_eq!(err.to_string(), "payment amount must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
