//! # Terminal State
//!
//! Shared ownership of the active checkout session.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` because:
//! 1. UI commands and the submission path both touch the session
//! 2. Only one operation may mutate it at a time
//! 3. Mutations are quick and synchronous (the session is pure), so the
//!    lock is never held across an await point

use std::sync::{Arc, Mutex};

use crate::session::CheckoutSession;

/// Shared handle to the lane's checkout session.
#[derive(Debug, Clone)]
pub struct TerminalState {
    session: Arc<Mutex<CheckoutSession>>,
}

impl TerminalState {
    /// Creates a state holding an idle session.
    pub fn new() -> Self {
        TerminalState {
            session: Arc::new(Mutex::new(CheckoutSession::new())),
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = state.with_session(|s| s.totals())?;
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CheckoutSession) -> R,
    {
        let session = self.session.lock().expect("Session mutex poisoned");
        f(&session)
    }

    /// Executes a function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// state.with_session_mut(|s| s.add_product(&product, 1))?;
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CheckoutSession) -> R,
    {
        let mut session = self.session.lock().expect("Session mutex poisoned");
        f(&mut session)
    }
}

impl Default for TerminalState {
    fn default() -> Self {
        Self::new()
    }
}
