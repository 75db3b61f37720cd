//! # Actionflow Core
//!
//! Core types for the actionflow unidirectional-data-flow runtime.
//!
//! This crate provides the primitives every part of the system is built
//! from:
//!
//! - **[`Subject`]**: generic synchronous publish/subscribe list
//! - **[`Dispatcher`]**: the single action bus (a `Subject` of actions)
//! - **Action model**: [`Action`], [`ActionKind`], [`ActionStatus`],
//!   [`ActionFactory`] and [`AsyncActionFactory`], the five-stage
//!   lifecycle contract for asynchronous operations
//! - **[`Handler`]**: how a store interprets the action stream into typed,
//!   store-specific change events
//!
//! The runtime crate adds the `Store` that drives handlers and the
//! `ActionCreator` orchestration that emits full lifecycles around async
//! bodies.
//!
//! ## Architecture principles
//!
//! - Unidirectional data flow: intents go through one bus, state changes
//!   come back out as store events
//! - Synchronous, ordered dispatch: a store's derived events for an action
//!   are published before the dispatching call returns
//! - Explicit wiring: the bus is constructed at process start and injected
//!   by handle, never reached through a global
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use actionflow_core::action::{ActionKind, AsyncActionFactory};
//! use actionflow_core::dispatcher::Dispatcher;
//!
//! let dispatcher = Arc::new(Dispatcher::new());
//!
//! let fetch: AsyncActionFactory<(), Vec<u32>, String, ()> =
//!     AsyncActionFactory::new(ActionKind::new("fetchNumbers"));
//!
//! dispatcher.dispatch(fetch.started.make(()));
//! dispatcher.dispatch(fetch.success.make(vec![1, 2, 3]));
//! dispatcher.dispatch(fetch.done.make(()));
//! ```
//!
//! [`Subject`]: subject::Subject
//! [`Dispatcher`]: dispatcher::Dispatcher
//! [`Action`]: action::Action
//! [`ActionKind`]: action::ActionKind
//! [`ActionStatus`]: action::ActionStatus
//! [`ActionFactory`]: action::ActionFactory
//! [`AsyncActionFactory`]: action::AsyncActionFactory
//! [`Handler`]: handler::Handler

pub mod action;
pub mod dispatcher;
pub mod handler;
pub mod subject;

// Re-export for handler return values.
pub use smallvec::{SmallVec, smallvec};
