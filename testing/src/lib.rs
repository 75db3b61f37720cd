//! # Actionflow Testing
//!
//! Testing utilities and helpers for the actionflow architecture.
//!
//! This crate provides:
//! - Recorders: listeners that capture dispatched actions or store events
//!   for later assertions
//! - Async wait helpers for observing fire-and-forget lifecycles
//! - Tracing initialization for test binaries
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use actionflow_core::action::{ActionKind, ActionStatus, AsyncActionFactory};
//! use actionflow_core::dispatcher::Dispatcher;
//! use actionflow_testing::recorders::ActionRecorder;
//!
//! let dispatcher = Arc::new(Dispatcher::new());
//! let recorder = ActionRecorder::new();
//! dispatcher.add_listener(recorder.listener());
//!
//! let fetch: AsyncActionFactory<(), u32, String, ()> =
//!     AsyncActionFactory::new(ActionKind::new("fetch"));
//! dispatcher.dispatch(fetch.started.make(()));
//!
//! assert_eq!(
//!     recorder.statuses_for(fetch.kind()),
//!     vec![ActionStatus::Started]
//! );
//! ```

/// Listeners that capture what flowed through a bus or a store channel.
pub mod recorders {
    use actionflow_core::action::{Action, ActionKind, ActionStatus};
    use actionflow_core::subject::Listener;
    use std::sync::{Arc, Mutex, PoisonError};

    /// Records the `(kind, status)` of every action a bus dispatches.
    ///
    /// Each call to [`listener`](Self::listener) produces a fresh listener
    /// identity feeding the same record; retain the returned `Arc` if the
    /// test needs to remove it again.
    #[derive(Debug, Default, Clone)]
    pub struct ActionRecorder {
        records: Arc<Mutex<Vec<(ActionKind, ActionStatus)>>>,
    }

    impl ActionRecorder {
        /// Create an empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// A listener that appends to this recorder.
        #[must_use]
        pub fn listener(&self) -> Listener<Action> {
            let records = Arc::clone(&self.records);
            Arc::new(move |action: &Action| {
                records
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((action.kind().clone(), action.status()));
            })
        }

        /// Every recorded `(kind, status)` pair, in dispatch order.
        #[must_use]
        pub fn records(&self) -> Vec<(ActionKind, ActionStatus)> {
            self.records
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// The status sequence observed for one kind, in dispatch order.
        #[must_use]
        pub fn statuses_for(&self, kind: &ActionKind) -> Vec<ActionStatus> {
            self.records()
                .into_iter()
                .filter(|(k, _)| k == kind)
                .map(|(_, status)| status)
                .collect()
        }

        /// Total number of recorded actions.
        #[must_use]
        pub fn len(&self) -> usize {
            self.records
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Whether nothing was recorded yet.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    /// Records every event published on a store's channel.
    #[derive(Debug)]
    pub struct EventRecorder<E> {
        events: Arc<Mutex<Vec<E>>>,
    }

    impl<E> EventRecorder<E>
    where
        E: Clone + Send + 'static,
    {
        /// Create an empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self {
                events: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// A listener that appends to this recorder.
        #[must_use]
        pub fn listener(&self) -> Listener<E> {
            let events = Arc::clone(&self.events);
            Arc::new(move |event: &E| {
                events
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(event.clone());
            })
        }

        /// Every recorded event, in publish order.
        #[must_use]
        pub fn events(&self) -> Vec<E> {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Total number of recorded events.
        #[must_use]
        pub fn len(&self) -> usize {
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Whether nothing was recorded yet.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl<E> Default for EventRecorder<E>
    where
        E: Clone + Send + 'static,
    {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<E> Clone for EventRecorder<E> {
        fn clone(&self) -> Self {
            Self {
                events: Arc::clone(&self.events),
            }
        }
    }
}

/// Async helpers for observing fire-and-forget lifecycles.
pub mod helpers {
    use std::time::Duration;

    /// Poll `condition` until it holds or `timeout` elapses.
    ///
    /// Returns whether the condition was observed in time. Lifecycle stages
    /// after `started` land on spawned tasks, so tests wait for the
    /// terminal `done` record before asserting on sequences.
    pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if condition() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

/// Initialize tracing for a test binary; safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

pub use helpers::wait_until;
pub use recorders::{ActionRecorder, EventRecorder};
