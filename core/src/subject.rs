//! Generic publish/subscribe primitive underlying both the [`Dispatcher`]
//! and the per-store event channels.
//!
//! A [`Subject`] keeps an ordered list of listeners and notifies all of them
//! synchronously when a value is dispatched. There is no batching, no
//! deduplication and no error isolation: a panicking listener propagates to
//! the caller of [`Subject::dispatch`] and aborts notification of the
//! listeners registered after it.
//!
//! # Listener identity
//!
//! Listeners are reference counted closures. Identity is the allocation
//! behind the [`Arc`], so a caller that wants to unsubscribe later must keep
//! the exact [`Listener`] it registered:
//!
//! ```
//! use std::sync::Arc;
//! use actionflow_core::subject::{Listener, Subject};
//!
//! let subject: Subject<u32> = Subject::new();
//! let listener: Listener<u32> = Arc::new(|value| {
//!     let _ = value;
//! });
//!
//! subject.add_listener(Arc::clone(&listener));
//! assert_eq!(subject.listener_count(), 1);
//!
//! subject.remove_listener(&listener);
//! assert_eq!(subject.listener_count(), 0);
//! ```
//!
//! # Re-entrancy
//!
//! [`Subject::dispatch`] iterates a snapshot of the listener list taken
//! before the first listener runs. A listener may therefore add or remove
//! listeners (including itself) while a dispatch is in flight; the change
//! takes effect from the next dispatch.
//!
//! [`Dispatcher`]: crate::dispatcher::Dispatcher

use std::sync::{Arc, Mutex, PoisonError};

/// A registered callback.
///
/// The value is passed by reference so dispatched types do not need to be
/// `Clone` for fan-out.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// An ordered list of listeners that can be notified synchronously.
///
/// The listener list sits behind a mutex so a shared `&Subject` can be
/// subscribed to and dispatched on concurrently; the lock is never held
/// while listener code runs.
pub struct Subject<T> {
    listeners: Mutex<Vec<Listener<T>>>,
}

impl<T> Subject<T> {
    /// Create a subject with no listeners.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Append a listener to the notification list.
    ///
    /// Listeners are notified in registration order. The same allocation may
    /// be registered more than once, in which case it is invoked once per
    /// registration.
    pub fn add_listener(&self, listener: Listener<T>) {
        self.lock().push(listener);
    }

    /// Remove the first registration of `listener`.
    ///
    /// Matching is by allocation identity, not by closure contents. Removing
    /// a listener that was never registered is a no-op.
    pub fn remove_listener(&self, listener: &Listener<T>) {
        let mut listeners = self.lock();
        if let Some(index) = listeners.iter().position(|l| same_listener(l, listener)) {
            listeners.remove(index);
        }
    }

    /// Remove every registered listener.
    ///
    /// Used by store teardown; after this call a dispatch notifies nobody.
    pub fn clear_listeners(&self) {
        self.lock().clear();
    }

    /// Invoke every currently registered listener with `value`.
    ///
    /// Notification is synchronous, in registration order, on the calling
    /// thread. The listener list is snapshotted up front, so re-entrant
    /// add/remove only affects later dispatches.
    ///
    /// # Panics
    ///
    /// A panic raised by a listener propagates to the caller; listeners
    /// registered after the panicking one are not notified for this value.
    pub fn dispatch(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self.lock().clone();
        for listener in snapshot {
            listener(value);
        }
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    /// Whether no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listener_count() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Listener<T>>> {
        // A poisoned list is still structurally valid; keep notifying.
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual Debug since listeners are opaque closures.
impl<T> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Compare listener identity by allocation address, ignoring vtables.
fn same_listener<T>(a: &Listener<T>, b: &Listener<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
