//! The [`Handler`] trait: how a store interprets the flat action stream.
//!
//! A handler is the store-specific projection logic: given the store's
//! mutable state and an incoming [`Action`], decide (via factory matching)
//! whether and how to mutate the state, and which derived events to publish
//! on the store's own channel. The runtime crate's `Store` drives it.
//!
//! Handlers receive **every** action dispatched on the bus; actions that
//! match none of the handler's factories are silently ignored, which is the
//! normal case, not an error.

use crate::action::Action;
use smallvec::SmallVec;

/// Derived events returned from one handler invocation.
///
/// A single incoming action may produce zero, one or several events (for
/// example a `Success` action both replaces entity state and flips a
/// loading flag). Small counts are the norm, hence the inline capacity.
pub type Events<E> = SmallVec<[E; 4]>;

/// Store-specific action interpretation.
///
/// # Example
///
/// ```
/// use actionflow_core::action::{Action, ActionKind, AsyncActionFactory};
/// use actionflow_core::handler::{Events, Handler};
/// use actionflow_core::smallvec;
/// use std::sync::LazyLock;
///
/// static FETCH: LazyLock<AsyncActionFactory<(), Vec<u32>, String, ()>> =
///     LazyLock::new(|| AsyncActionFactory::new(ActionKind::new("fetch")));
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum NumbersEvent {
///     Changed,
/// }
///
/// struct NumbersHandler;
///
/// impl Handler for NumbersHandler {
///     type State = Vec<u32>;
///     type Event = NumbersEvent;
///
///     fn handle(&self, state: &mut Self::State, action: &Action) -> Events<Self::Event> {
///         if let Some(numbers) = FETCH.success.data(action) {
///             *state = numbers.clone();
///             return smallvec![NumbersEvent::Changed];
///         }
///         Events::new()
///     }
/// }
/// ```
pub trait Handler: Send + Sync {
    /// The private state this handler mutates.
    type State;

    /// The derived event type republished on the store's channel.
    type Event;

    /// Interpret one action.
    ///
    /// Mutate `state` as needed and return the events to publish, in order.
    /// Return an empty collection for actions this store does not care
    /// about.
    fn handle(&self, state: &mut Self::State, action: &Action) -> Events<Self::Event>;
}
