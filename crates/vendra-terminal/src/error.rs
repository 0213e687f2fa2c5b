//! # Terminal Error Type
//!
//! Unified error type surfaced to the UI shell.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Vendra POS                             │
//! │                                                                         │
//! │  CoreError ────────┐                                                    │
//! │  (validation,      │                                                    │
//! │   business rules)  │                                                    │
//! │                    ├──► TerminalError { code, message } ──► UI shell    │
//! │  StoreError ───────┤         serialized as                              │
//! │  (local SQLite)    │    {"code":"PAYMENT_ERROR","message":"..."}        │
//! │                    │                                                    │
//! │  ClientError ──────┘                                                    │
//! │  (backend HTTP; server `error` bodies pass through verbatim)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use vendra_client::ClientError;
use vendra_core::CoreError;
use vendra_store::StoreError;

use crate::session::SessionError;

/// Error surfaced from terminal operations.
///
/// ## Serialization
/// This is what the UI shell receives when an operation fails:
/// ```json
/// {
///   "code": "PAYMENT_ERROR",
///   "message": "Insufficient tender: 1500 of 1890 cents covered"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct TerminalError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for terminal responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Cart operation failed
    CartError,

    /// Payment/tender error
    PaymentError,

    /// Operation not legal in the current checkout phase
    InvalidPhase,

    /// Local store failure
    StoreError,

    /// Backend/network failure
    NetworkError,

    /// The bearer session is no longer valid
    SessionExpired,

    /// Anything else
    Internal,
}

impl TerminalError {
    /// Creates a new terminal error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        TerminalError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        TerminalError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        TerminalError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        TerminalError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to terminal errors.
impl From<CoreError> for TerminalError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::LineNotFound(_) => ErrorCode::CartError,
            CoreError::CartTooLarge { .. } | CoreError::QuantityTooLarge { .. } => {
                ErrorCode::CartError
            }
            CoreError::EmptyCart => ErrorCode::CartError,
            CoreError::InvalidPaymentAmount { .. }
            | CoreError::GuestTender { .. }
            | CoreError::LoyaltyExceedsBalance { .. }
            | CoreError::EwalletExceedsBalance { .. }
            | CoreError::InsufficientTender { .. } => ErrorCode::PaymentError,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        TerminalError::new(code, err.to_string())
    }
}

/// Converts store errors to terminal errors.
impl From<StoreError> for TerminalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => TerminalError::not_found(&entity, &id),
            other => {
                // Log the detail, surface a category
                tracing::error!("Store operation failed: {}", other);
                TerminalError::new(ErrorCode::StoreError, other.to_string())
            }
        }
    }
}

/// Converts client errors to terminal errors.
///
/// Server `error`-body messages pass through verbatim - the operator sees
/// exactly what the backend said.
impl From<ClientError> for TerminalError {
    fn from(err: ClientError) -> Self {
        let code = if err.is_session_invalid() {
            ErrorCode::SessionExpired
        } else {
            match &err {
                ClientError::NotFound(_) => ErrorCode::NotFound,
                ClientError::Validation(_) => ErrorCode::ValidationError,
                ClientError::InvalidConfig(_) => ErrorCode::Internal,
                _ => ErrorCode::NetworkError,
            }
        };
        TerminalError::new(code, err.to_string())
    }
}

/// Converts session state machine errors to terminal errors.
impl From<SessionError> for TerminalError {
    fn from(err: SessionError) -> Self {
        TerminalError::new(ErrorCode::InvalidPhase, err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let err = TerminalError::new(ErrorCode::PaymentError, "no method selected");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "PAYMENT_ERROR");
        assert_eq!(json["message"], "no method selected");
    }

    #[test]
    fn test_core_error_mapping() {
        let err: TerminalError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::CartError);

        let err: TerminalError = CoreError::InsufficientTender {
            total_cents: 1890,
            tendered_cents: 1500,
        }
        .into();
        assert_eq!(err.code, ErrorCode::PaymentError);
    }

    #[test]
    fn test_client_error_mapping() {
        let err: TerminalError = ClientError::Unauthorized.into();
        assert_eq!(err.code, ErrorCode::SessionExpired);

        let err: TerminalError = ClientError::Validation("bad cart".into()).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("bad cart"));

        let err: TerminalError = ClientError::Timeout.into();
        assert_eq!(err.code, ErrorCode::NetworkError);
    }
}
