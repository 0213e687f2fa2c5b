//! # vendra-terminal: Cashier-Lane Orchestration
//!
//! One terminal process per lane. This crate owns the checkout session
//! state machine, wires it to the backend client and the lane-local store,
//! and runs the background loops (outbox flusher, session monitor).
//!
//! ## A Checkout, End to End
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Idle ──scan──► BuildingCart ──begin_tender──► AwaitingPayment         │
//! │                     ▲                               │                   │
//! │                     │ cancel_tender                 │ submit            │
//! │                     └───────────────────────────────┤                   │
//! │                                                     ▼                   │
//! │                                                Submitting               │
//! │                                                 │   │   │               │
//! │                accepted (order id) ◄────────────┘   │   └── permanent   │
//! │                        │          queued (outbox) ◄─┘       failure     │
//! │                        ▼                  │                   │         │
//! │                    Completed ◄────────────┘                   ▼         │
//! │                        │                             AwaitingPayment    │
//! │                 new_sale│                            (error shown,      │
//! │                        ▼                              payments and      │
//! │                      Idle                             request id kept)  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Holding a cart from `BuildingCart` parks it in the local store and
//! resets the session; resuming restores it exactly.

pub mod config;
pub mod error;
pub mod flusher;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod terminal;

pub use config::TerminalConfig;
pub use error::{ErrorCode, TerminalError};
pub use flusher::{FlusherConfig, OutboxFlusher, OutboxFlusherHandle};
pub use session::{CartSnapshot, CheckoutPhase, CheckoutSession, SubmissionOutcome};
pub use state::TerminalState;
pub use terminal::Terminal;
