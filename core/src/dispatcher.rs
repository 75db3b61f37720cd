//! The single action bus through which all state-changing intents flow.
//!
//! A [`Dispatcher`] is a [`Subject`] of [`Action`]s with a name. One instance
//! is constructed explicitly at process start, wrapped in an [`Arc`] and
//! injected by handle into every action creator and store; there is no
//! implicit global, so tests construct isolated buses freely.
//!
//! ```
//! use std::sync::Arc;
//! use actionflow_core::dispatcher::Dispatcher;
//!
//! let dispatcher = Arc::new(Dispatcher::new());
//! // hand Arc clones to creators and stores
//! let for_store = Arc::clone(&dispatcher);
//! # let _ = for_store;
//! ```
//!
//! Dispatch is synchronous and non-suspending: all listeners registered at
//! the moment of dispatch run to completion, in registration order, before
//! control returns to the dispatching caller.
//!
//! [`Arc`]: std::sync::Arc

use crate::action::Action;
use crate::subject::{Listener, Subject};

/// The shared action bus.
#[derive(Debug, Default)]
pub struct Dispatcher {
    bus: Subject<Action>,
}

impl Dispatcher {
    /// Create a bus with no listeners.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bus: Subject::new(),
        }
    }

    /// Dispatch an action to every registered listener, synchronously.
    pub fn dispatch(&self, action: Action) {
        tracing::trace!(
            kind = %action.kind(),
            status = %action.status(),
            listeners = self.bus.listener_count(),
            "dispatching action"
        );
        self.bus.dispatch(&action);
    }

    /// Register a listener; it receives every subsequently dispatched action.
    pub fn add_listener(&self, listener: Listener<Action>) {
        self.bus.add_listener(listener);
    }

    /// Remove a previously registered listener (identity match, no-op if
    /// absent).
    pub fn remove_listener(&self, listener: &Listener<Action>) {
        self.bus.remove_listener(listener);
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.bus.listener_count()
    }
}
