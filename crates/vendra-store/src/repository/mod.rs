//! # Repositories
//!
//! Repository implementations for the lane-local store.
//!
//! Each repository wraps the shared pool and owns the SQL for one table.

pub mod hold;
pub mod outbox;
