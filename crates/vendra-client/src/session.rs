//! # Session Monitor
//!
//! Background liveness probe for the bearer session.
//!
//! ## Behavior
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session Monitor Loop                              │
//! │                                                                         │
//! │  every 30s ──► GET /auth/validate-session                              │
//! │                      │                                                  │
//! │                      ├── 2xx            → still Active                  │
//! │                      ├── 401/403        → publish Expired, stop         │
//! │                      └── network/5xx    → warn, still Active            │
//! │                                                                         │
//! │  The terminal watches the status channel and stops accepting           │
//! │  submissions once Expired. Cart state is NEVER discarded on expiry -   │
//! │  the operator holds or re-authenticates and carries on.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A transient outage must not log the cashier out mid-sale, so only an
//! explicit 401/403 expires the session.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::error::ClientResult;
use crate::http::HttpClient;

/// Default probe cadence.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(30);

/// Liveness of the bearer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The backend still accepts the token.
    Active,
    /// The backend answered 401/403; a fresh login is required.
    Expired,
}

/// Background probe of `GET /auth/validate-session`.
pub struct SessionMonitor {
    http: HttpClient,
    probe_interval: Duration,
    status_tx: watch::Sender<SessionStatus>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for observing and stopping the monitor.
#[derive(Debug, Clone)]
pub struct SessionMonitorHandle {
    status_rx: watch::Receiver<SessionStatus>,
    shutdown_tx: mpsc::Sender<()>,
}

impl SessionMonitorHandle {
    /// The current session status.
    pub fn status(&self) -> SessionStatus {
        *self.status_rx.borrow()
    }

    /// A watch receiver for reacting to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_rx.clone()
    }

    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl SessionMonitor {
    /// Creates a monitor and its handle.
    pub fn new(http: HttpClient, probe_interval: Duration) -> (Self, SessionMonitorHandle) {
        let (status_tx, status_rx) = watch::channel(SessionStatus::Active);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let monitor = SessionMonitor {
            http,
            probe_interval,
            status_tx,
            shutdown_rx,
        };

        let handle = SessionMonitorHandle {
            status_rx,
            shutdown_tx,
        };

        (monitor, handle)
    }

    /// Runs the probe loop.
    ///
    /// This should be spawned as a background task. The loop ends on
    /// shutdown or once the session expires (a dead token never revives).
    pub async fn run(mut self) {
        info!(interval_secs = self.probe_interval.as_secs(), "Session monitor starting");

        let mut interval = tokio::time::interval(self.probe_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.probe().await {
                        Ok(()) => {
                            debug!("Session still valid");
                        }
                        Err(e) if e.is_session_invalid() => {
                            warn!("Session expired: {}", e);
                            let _ = self.status_tx.send(SessionStatus::Expired);
                            break;
                        }
                        Err(e) => {
                            // Transient failure - the session may well still
                            // be fine, so don't lock the lane over it.
                            warn!("Session probe failed (transient): {}", e);
                        }
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Session monitor shutting down");
                    break;
                }
            }
        }

        info!("Session monitor stopped");
    }

    /// One probe round-trip. The body is irrelevant; only the status
    /// classification matters.
    async fn probe(&self) -> ClientResult<()> {
        let _: serde_json::Value = self.http.get("/auth/validate-session").await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
