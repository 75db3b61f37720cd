//! # Actionflow Runtime
//!
//! Runtime implementation for the actionflow architecture.
//!
//! This crate provides the two active pieces that sit on top of the core
//! types:
//!
//! - **[`Store`]**: subscribes a [`Handler`] to the bus, owns the store's
//!   private state and republishes derived events on the store's own channel
//! - **[`ActionCreator`]**: sequences the five-stage action lifecycle
//!   (started → success/failed → done) around an asynchronous body and
//!   dispatches every stage onto the bus
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use actionflow_core::dispatcher::Dispatcher;
//! use actionflow_runtime::{ActionCreator, Store};
//!
//! let dispatcher = Arc::new(Dispatcher::new());
//! let store = Store::new(Arc::clone(&dispatcher), MyState::default(), MyHandler);
//!
//! let creator = MyCreator::new(Arc::clone(&dispatcher), api);
//! creator.get_entities(); // fire and forget; observe through the store
//!
//! let entities = store.state(|s| s.clone());
//! ```
//!
//! [`Handler`]: actionflow_core::handler::Handler

/// Action lifecycle orchestration around asynchronous bodies.
pub mod creator;

/// The store runtime driving handlers off the bus.
pub mod store;

/// Error types for the store runtime.
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during store operations.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// `tear_down` was called on a store that is already torn down.
        ///
        /// Teardown is terminal; a torn-down store neither reacts to
        /// actions nor notifies listeners, and cannot be resurrected.
        #[error("store is already torn down")]
        AlreadyTornDown,
    }
}

pub use creator::{ActionCreator, AsyncOpFactory};
pub use error::StoreError;
pub use store::Store;
