//! Action model: the tagged records that flow over the [`Dispatcher`] and
//! the factories that stamp them.
//!
//! Every state-changing intent in the system is an [`Action`] carrying a
//! [`kind`](ActionKind) (which logical operation it belongs to), a
//! [`status`](ActionStatus) (which lifecycle stage it represents) and a
//! payload typed per stage. Because a single bus carries actions for every
//! operation, payloads are type-erased in transit; the only supported way to
//! read one back is through the [`ActionFactory`] that produced the action,
//! which statically knows the payload type.
//!
//! # Lifecycle
//!
//! ```text
//! Started ──► Success ──► Done
//!        └──► Failed  ──►
//!
//! Invalidated: independent signal for superseded results, usable any time
//! ```
//!
//! The ordering is a convention enforced by the action-creator orchestration
//! in the runtime crate, not by the types here.
//!
//! # Example
//!
//! ```
//! use actionflow_core::action::{ActionKind, ActionStatus, AsyncActionFactory};
//!
//! // One factory per logical operation, created once and reused.
//! let fetch: AsyncActionFactory<(), Vec<u32>, String, ()> =
//!     AsyncActionFactory::new(ActionKind::new("fetchNumbers"));
//!
//! let action = fetch.success.make(vec![1, 2, 3]);
//! assert_eq!(action.status(), ActionStatus::Success);
//! assert!(fetch.success.is_match(&action));
//! assert_eq!(fetch.success.data(&action), Some(&vec![1, 2, 3]));
//!
//! // Other stages of the same kind do not match.
//! assert!(!fetch.failed.is_match(&action));
//! ```
//!
//! [`Dispatcher`]: crate::dispatcher::Dispatcher

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// Identifier grouping all lifecycle stages of one logical operation.
///
/// Kinds are mandatory and caller supplied; a kind is expected to be unique
/// per [`AsyncActionFactory`] and stable for the factory's lifetime, so it
/// reads well in logs and survives process restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKind(Arc<str>);

impl ActionKind {
    /// Create a kind from a stable, human-readable name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The kind as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The stage within a kind's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionStatus {
    /// The operation began; dispatched before the async body is polled.
    Started,
    /// The operation completed with a value.
    Success,
    /// The operation raised an error.
    Failed,
    /// The operation's result was superseded; dispatched manually.
    Invalidated,
    /// The operation finished, after either outcome.
    Done,
}

impl ActionStatus {
    /// Whether this status ends one invocation's lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Invalidated)
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
            Self::Invalidated => write!(f, "invalidated"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Type-erased payload carried by an action in transit.
type Payload = Arc<dyn Any + Send + Sync>;

/// Errors raised by typed access to action payloads.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The action matched a factory's `kind`/`status` pair but its payload
    /// was not of the type that factory stamps. Something other than the
    /// factory fabricated a colliding action.
    #[error("action '{kind}'/{status} does not carry this factory's payload type")]
    PayloadMismatch {
        /// Kind of the offending action.
        kind: ActionKind,
        /// Status of the offending action.
        status: ActionStatus,
    },

    /// The action does not belong to this factory at all.
    #[error("action '{kind}'/{status} was not produced by this factory")]
    NotThisFactory {
        /// Kind of the offending action.
        kind: ActionKind,
        /// Status of the offending action.
        status: ActionStatus,
    },
}

/// The unit of communication on the bus.
///
/// Actions are cheap to clone; payload and metadata are reference counted.
#[derive(Clone)]
pub struct Action {
    kind: ActionKind,
    status: ActionStatus,
    data: Payload,
    metadata: Option<Payload>,
}

impl Action {
    /// The operation this action belongs to.
    #[must_use]
    pub const fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// The lifecycle stage this action represents.
    #[must_use]
    pub const fn status(&self) -> ActionStatus {
        self.status
    }

    /// Whether a metadata value was supplied at dispatch time.
    #[must_use]
    pub const fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }
}

// Manual Debug since the payload is opaque in transit.
impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("kind", &self.kind)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// A pure value pairing a `kind`/`status` with a typed constructor.
///
/// Factories are only obtainable through [`AsyncActionFactory`], which keeps
/// the invariant that matching `kind`/`status` pairs cannot be fabricated
/// anywhere else.
pub struct ActionFactory<D, M = ()> {
    kind: ActionKind,
    status: ActionStatus,
    _marker: PhantomData<fn(D, M)>,
}

impl<D, M> ActionFactory<D, M>
where
    D: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    pub(crate) fn new(kind: ActionKind, status: ActionStatus) -> Self {
        Self {
            kind,
            status,
            _marker: PhantomData,
        }
    }

    /// The kind this factory stamps.
    #[must_use]
    pub const fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// The status this factory stamps.
    #[must_use]
    pub const fn status(&self) -> ActionStatus {
        self.status
    }

    /// Construct an action with `data` and no metadata.
    #[must_use]
    pub fn make(&self, data: D) -> Action {
        Action {
            kind: self.kind.clone(),
            status: self.status,
            data: Arc::new(data),
            metadata: None,
        }
    }

    /// Construct an action with `data` and a metadata side-channel value.
    #[must_use]
    pub fn make_with(&self, data: D, metadata: M) -> Action {
        Action {
            kind: self.kind.clone(),
            status: self.status,
            data: Arc::new(data),
            metadata: Some(Arc::new(metadata)),
        }
    }

    /// Construct an action with `data` and optional metadata.
    ///
    /// Convenience for orchestration code that threads a caller-supplied
    /// `Option<M>` through every stage of a lifecycle.
    #[must_use]
    pub fn make_opt(&self, data: D, metadata: Option<M>) -> Action {
        match metadata {
            Some(metadata) => self.make_with(data, metadata),
            None => self.make(data),
        }
    }

    /// Test whether `action` was produced by this factory.
    ///
    /// Equality is exact on both `kind` and `status`; this is the only
    /// supported way to branch on action identity.
    #[must_use]
    pub fn is_match(&self, action: &Action) -> bool {
        action.kind == self.kind && action.status == self.status
    }

    /// The action's payload, if `action` was produced by this factory.
    ///
    /// Combines [`is_match`](Self::is_match) with the typed downcast, so a
    /// handler can match and read in one step:
    ///
    /// ```
    /// # use actionflow_core::action::{ActionKind, AsyncActionFactory};
    /// # let fetch: AsyncActionFactory<(), u32, String, ()> =
    /// #     AsyncActionFactory::new(ActionKind::new("fetch"));
    /// # let action = fetch.success.make(42);
    /// if let Some(value) = fetch.success.data(&action) {
    ///     assert_eq!(*value, 42);
    /// }
    /// ```
    #[must_use]
    pub fn data<'a>(&self, action: &'a Action) -> Option<&'a D> {
        if !self.is_match(action) {
            return None;
        }
        action.data.downcast_ref::<D>()
    }

    /// Fallible form of [`data`](Self::data), distinguishing "not this
    /// factory's action" from a payload type collision.
    ///
    /// # Errors
    ///
    /// [`ActionError::NotThisFactory`] when `kind`/`status` do not match;
    /// [`ActionError::PayloadMismatch`] when they match but the payload is
    /// of a different type (a fabricated action).
    pub fn try_data<'a>(&self, action: &'a Action) -> Result<&'a D, ActionError> {
        if !self.is_match(action) {
            return Err(ActionError::NotThisFactory {
                kind: action.kind.clone(),
                status: action.status,
            });
        }
        action
            .data
            .downcast_ref::<D>()
            .ok_or_else(|| ActionError::PayloadMismatch {
                kind: action.kind.clone(),
                status: action.status,
            })
    }

    /// The metadata supplied at dispatch time, if any.
    ///
    /// Returns `None` when the action is not this factory's, when no
    /// metadata was supplied, or when the metadata type differs.
    #[must_use]
    pub fn metadata<'a>(&self, action: &'a Action) -> Option<&'a M> {
        if !self.is_match(action) {
            return None;
        }
        action.metadata.as_ref()?.downcast_ref::<M>()
    }
}

// Manual Clone: the marker must not require D/M to be Clone.
impl<D, M> Clone for ActionFactory<D, M> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            status: self.status,
            _marker: PhantomData,
        }
    }
}

impl<D, M> std::fmt::Debug for ActionFactory<D, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionFactory")
            .field("kind", &self.kind)
            .field("status", &self.status)
            .finish()
    }
}

/// An immutable bundle of the five stage factories for one named
/// asynchronous operation, all sharing one [`ActionKind`].
///
/// # Type parameters
///
/// - `S`: payload of the `started` and `done` stages
/// - `D`: payload of the `success` stage
/// - `F`: payload of the `failed` stage
/// - `I`: payload of the `invalidated` stage
/// - `M`: metadata type shared by all stages (defaults to `()`)
///
/// Create one per operation, once, and reuse it for every invocation,
/// typically in a `LazyLock` static next to the store that interprets it.
pub struct AsyncActionFactory<S, D, F, I, M = ()> {
    kind: ActionKind,
    /// Stamps the work-began stage.
    pub started: ActionFactory<S, M>,
    /// Stamps the completed-with-value stage.
    pub success: ActionFactory<D, M>,
    /// Stamps the raised-an-error stage.
    pub failed: ActionFactory<F, M>,
    /// Stamps the superseded-result signal.
    pub invalidated: ActionFactory<I, M>,
    /// Stamps the finished stage.
    pub done: ActionFactory<S, M>,
}

impl<S, D, F, I, M> AsyncActionFactory<S, D, F, I, M>
where
    S: Send + Sync + 'static,
    D: Send + Sync + 'static,
    F: Send + Sync + 'static,
    I: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    /// Create the five stage factories for `kind`.
    #[must_use]
    pub fn new(kind: ActionKind) -> Self {
        Self {
            started: ActionFactory::new(kind.clone(), ActionStatus::Started),
            success: ActionFactory::new(kind.clone(), ActionStatus::Success),
            failed: ActionFactory::new(kind.clone(), ActionStatus::Failed),
            invalidated: ActionFactory::new(kind.clone(), ActionStatus::Invalidated),
            done: ActionFactory::new(kind.clone(), ActionStatus::Done),
            kind,
        }
    }

    /// The kind shared by all five stages.
    #[must_use]
    pub const fn kind(&self) -> &ActionKind {
        &self.kind
    }
}

// Manual Clone/Debug: the payload parameters are markers and must not be
// required to implement either.
impl<S, D, F, I, M> Clone for AsyncActionFactory<S, D, F, I, M> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            started: self.started.clone(),
            success: self.success.clone(),
            failed: self.failed.clone(),
            invalidated: self.invalidated.clone(),
            done: self.done.clone(),
        }
    }
}

impl<S, D, F, I, M> std::fmt::Debug for AsyncActionFactory<S, D, F, I, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncActionFactory")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Test whether `action` was produced by `factory`.
///
/// Free-function spelling of [`ActionFactory::is_match`] for call sites that
/// read better predicate-first.
#[must_use]
pub fn is_action<D, M>(action: &Action, factory: &ActionFactory<D, M>) -> bool
where
    D: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    factory.is_match(action)
}
