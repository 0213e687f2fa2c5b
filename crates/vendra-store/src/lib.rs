//! # vendra-store: Local Persistence for Vendra POS
//!
//! This crate provides the lane-local SQLite database: the durable order
//! submission outbox and held-order snapshots.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vendra POS Data Flow                             │
//! │                                                                         │
//! │  Terminal submit (retryable failure)          Terminal hold()          │
//! │       │                                            │                    │
//! │       ▼                                            ▼                    │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vendra-store (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Store      │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (outbox.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │◄───│ (hold.rs)     │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (one per lane)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//! - [`repository`] - Repository implementations (outbox, hold)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vendra_store::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("path/to/lane.db")).await?;
//! store.outbox().enqueue(&request_id, &payload_json).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};
pub use repository::hold::{HeldOrder, HoldRepository};
pub use repository::outbox::{OutboxEntry, OutboxRepository};
