//! # vendra-client: REST Client for the Vendra Backend
//!
//! The lane is a pure REST consumer: catalog, customers, tender types and
//! orders all live on the backend and are reached over JSON/HTTP with a
//! bearer token. This crate owns that surface.
//!
//! ## Endpoint Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Backend::products()    GET  /products                                  │
//! │                         GET  /products/barcode/:code                    │
//! │  Backend::customers()   GET  /customers                                 │
//! │                         GET  /customers/:id                             │
//! │                         GET  /customers/barcode/:code                   │
//! │  Backend::orders()      GET  /payment-methods                           │
//! │                         POST /orders            (+ Idempotency-Key)     │
//! │                         GET  /orders/:id                                │
//! │                         POST /orders/:id/cancel                         │
//! │                         DELETE /orders/:id                              │
//! │                         POST /orders/refund                             │
//! │  SessionMonitor         GET  /auth/validate-session  (every 30s)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Classification
//! Every failure funnels into [`ClientError`]; `is_retryable()` is the one
//! place that decides what the outbox flusher may retry. Server error
//! bodies carry a JSON `error` field whose message is preserved verbatim.

pub mod config;
pub mod customers;
pub mod error;
pub mod http;
pub mod orders;
pub mod products;
pub mod session;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{Backend, HttpClient};
pub use orders::{OrderAck, OrderReceipt, RefundRequest};
pub use session::{SessionMonitor, SessionMonitorHandle, SessionStatus};
