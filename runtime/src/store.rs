//! The store runtime: projects the flat action stream into typed,
//! store-specific change notifications.
//!
//! A [`Store`] wires a [`Handler`] to the [`Dispatcher`] at construction.
//! From then on every dispatched action reaches the handler, which mutates
//! the store's private state and returns the derived events to publish on
//! the store's own [`Subject`] channel.
//!
//! # Ordering guarantee
//!
//! Dispatcher notification is synchronous and in registration order, so a
//! store's derived events for a given source action are always published
//! before `Dispatcher::dispatch` returns to whoever dispatched that action.
//! Same-thread observers get read-after-write consistency: once a creator's
//! dispatch call returns, the store state and its listeners have already
//! seen the action.
//!
//! # Locking
//!
//! The state lock is held only while the handler runs; derived events are
//! published after it is released, so an event listener may call
//! [`Store::state`] without deadlocking.

use actionflow_core::action::Action;
use actionflow_core::dispatcher::Dispatcher;
use actionflow_core::handler::Handler;
use actionflow_core::subject::{Listener, Subject};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::StoreError;

/// A store: private state plus a derived-event channel, driven by a
/// [`Handler`] subscribed to the bus.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use actionflow_core::action::{Action, ActionKind, AsyncActionFactory};
/// use actionflow_core::dispatcher::Dispatcher;
/// use actionflow_core::handler::{Events, Handler};
/// use actionflow_core::smallvec;
/// use actionflow_runtime::Store;
/// use std::sync::LazyLock;
///
/// static FETCH: LazyLock<AsyncActionFactory<(), u32, String, ()>> =
///     LazyLock::new(|| AsyncActionFactory::new(ActionKind::new("fetch")));
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum CounterEvent {
///     Changed,
/// }
///
/// struct CounterHandler;
///
/// impl Handler for CounterHandler {
///     type State = u32;
///     type Event = CounterEvent;
///
///     fn handle(&self, state: &mut u32, action: &Action) -> Events<CounterEvent> {
///         if let Some(value) = FETCH.success.data(action) {
///             *state = *value;
///             return smallvec![CounterEvent::Changed];
///         }
///         Events::new()
///     }
/// }
///
/// let dispatcher = Arc::new(Dispatcher::new());
/// let store = Store::new(Arc::clone(&dispatcher), 0, CounterHandler);
///
/// dispatcher.dispatch(FETCH.success.make(41));
/// assert_eq!(store.state(|s| *s), 41);
/// ```
pub struct Store<H: Handler> {
    inner: Arc<Inner<H>>,
    dispatcher: Arc<Dispatcher>,
    /// The exact listener registered with the dispatcher, retained so
    /// teardown can remove it by identity.
    registration: Listener<Action>,
    torn_down: AtomicBool,
}

struct Inner<H: Handler> {
    state: Mutex<H::State>,
    handler: H,
    channel: Subject<H::Event>,
}

impl<H> Inner<H>
where
    H: Handler,
{
    fn handle_action(&self, action: &Action) {
        let events = {
            let mut state = lock_state(&self.state);
            self.handler.handle(&mut state, action)
        };

        if events.is_empty() {
            return;
        }

        tracing::trace!(
            kind = %action.kind(),
            status = %action.status(),
            events = events.len(),
            "store derived events"
        );
        metrics::counter!("store.events_published").increment(events.len() as u64);

        // Published after the state lock is released and before the
        // dispatcher's dispatch call returns to its caller.
        for event in events {
            self.channel.dispatch(&event);
        }
    }
}

impl<H> Store<H>
where
    H: Handler + 'static,
    H::State: Send + 'static,
    H::Event: 'static,
{
    /// Create a store and register it with the dispatcher.
    ///
    /// From this call on, the handler receives every dispatched action,
    /// regardless of origin, until [`tear_down`](Self::tear_down).
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, initial_state: H::State, handler: H) -> Self {
        let inner = Arc::new(Inner {
            state: Mutex::new(initial_state),
            handler,
            channel: Subject::new(),
        });

        let registration: Listener<Action> = {
            let inner = Arc::clone(&inner);
            Arc::new(move |action: &Action| inner.handle_action(action))
        };
        dispatcher.add_listener(Arc::clone(&registration));

        Self {
            inner,
            dispatcher,
            registration,
            torn_down: AtomicBool::new(false),
        }
    }

    /// Read the store's state through a closure, under the state lock.
    ///
    /// External consumers get read-only access; only the handler mutates.
    pub fn state<R>(&self, read: impl FnOnce(&H::State) -> R) -> R {
        let state = lock_state(&self.inner.state);
        read(&state)
    }

    /// Subscribe to the store's derived events.
    ///
    /// Retain a clone of the registered `Arc` if you intend to
    /// [`remove_listener`](Self::remove_listener) later; removal matches by
    /// identity.
    pub fn add_listener(&self, listener: Listener<H::Event>) {
        self.inner.channel.add_listener(listener);
    }

    /// Unsubscribe a previously registered event listener.
    pub fn remove_listener(&self, listener: &Listener<H::Event>) {
        self.inner.channel.remove_listener(listener);
    }

    /// Number of event listeners currently subscribed.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.channel.listener_count()
    }

    /// Deregister from the dispatcher and drop all event listeners.
    ///
    /// Terminal: after teardown the store neither reacts to further actions
    /// nor notifies anyone, and there is no resurrection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyTornDown`] on a second call.
    pub fn tear_down(&self) -> Result<(), StoreError> {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return Err(StoreError::AlreadyTornDown);
        }

        self.dispatcher.remove_listener(&self.registration);
        self.inner.channel.clear_listeners();

        tracing::debug!("store torn down");
        metrics::counter!("store.torn_down").increment(1);
        Ok(())
    }

    /// Whether [`tear_down`](Self::tear_down) has run.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }
}

impl<H: Handler> std::fmt::Debug for Store<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("listeners", &self.inner.channel.listener_count())
            .field("torn_down", &self.torn_down.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

/// A poisoned state lock keeps the last coherent state; keep serving it.
fn lock_state<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
