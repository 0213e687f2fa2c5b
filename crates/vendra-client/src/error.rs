//! # Client Error Types
//!
//! The error taxonomy for backend communication.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP status / transport condition          ClientError        retry?   │
//! │  ─────────────────────────────────          ───────────        ──────   │
//! │  401 Unauthorized                           Unauthorized       no       │
//! │  403 Forbidden                              Forbidden          no       │
//! │  404 Not Found                              NotFound           no       │
//! │  400 / 422                                  Validation         no       │
//! │  5xx                                        Server             yes      │
//! │  request timed out                          Timeout            yes      │
//! │  connection refused / DNS / TLS             Network            yes      │
//! │  body was not the expected JSON             InvalidResponse    no       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `is_retryable()` is the single classification point the outbox flusher
//! trusts; nothing else decides retry policy.

use thiserror::Error;

/// Errors from backend communication.
#[derive(Debug, Error)]
pub enum ClientError {
    /// 401 - the bearer session is gone.
    #[error("Unauthorized: session is no longer valid")]
    Unauthorized,

    /// 403 - authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404 - the resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 400/422 - the server rejected the request as invalid.
    /// The message is the server's `error` field, verbatim.
    #[error("Rejected by server: {0}")]
    Validation(String),

    /// 5xx - the server failed; the request may be retried.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The request timed out in flight.
    #[error("Request timed out")]
    Timeout,

    /// Transport-level failure (connection refused, DNS, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not what the endpoint promised.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The client was misconfigured (bad base URL, ...).
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Whether the outbox flusher may retry the request later.
    ///
    /// Transient transport failures and server-side 5xx are retryable;
    /// everything the server *decided* about (4xx) is permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Server { .. } | ClientError::Timeout | ClientError::Network(_)
        )
    }

    /// Whether the failure means the bearer session is invalid.
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, ClientError::Unauthorized | ClientError::Forbidden(_))
    }
}

/// Transport errors map onto the taxonomy at the reqwest boundary.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

// =============================================================================
// Unit Tests
// =============================================================================
