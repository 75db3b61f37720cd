//! Action-creator orchestration: emit an operation's full lifecycle onto
//! the bus around an asynchronous body.
//!
//! [`ActionCreator`] is the base abstraction concrete creators implement by
//! supplying their injected [`Dispatcher`] handle; the stage methods and
//! [`try_catch`](ActionCreator::try_catch) come for free, the Rust shape of
//! an abstract base class.
//!
//! # Lifecycle discipline
//!
//! [`try_catch`](ActionCreator::try_catch) is the only place the
//! started → success/failed → done ordering is enforced. The individual
//! stage methods dispatch unconditionally; nothing in the types prevents
//! out-of-order stages, so hand-rolled sequences (for example manual
//! `invalidated` signals) are the caller's responsibility.

use actionflow_core::action::AsyncActionFactory;
use actionflow_core::dispatcher::Dispatcher;
use std::future::Future;
use std::sync::Arc;

/// The factory shape [`ActionCreator::try_catch`] drives: no payload on
/// `started`/`done`/`invalidated`, an [`anyhow::Error`] on `failed`.
pub type AsyncOpFactory<D, M = ()> = AsyncActionFactory<(), D, anyhow::Error, (), M>;

/// Base abstraction for emitting action lifecycles.
///
/// Implementors provide the bus handle; every provided method performs
/// exactly one dispatch per call, synchronously, through that handle.
///
/// # Example
///
/// ```ignore
/// struct EntityActionCreator {
///     dispatcher: Arc<Dispatcher>,
///     api: Arc<FakeApi>,
/// }
///
/// impl ActionCreator for EntityActionCreator {
///     fn dispatcher(&self) -> &Arc<Dispatcher> {
///         &self.dispatcher
///     }
/// }
///
/// impl EntityActionCreator {
///     fn get_entities(&self) {
///         let api = Arc::clone(&self.api);
///         self.try_catch(&ENTITY_ACTIONS.get_entities, async move {
///             api.get_entities().await
///         }, None);
///     }
/// }
/// ```
pub trait ActionCreator {
    /// The injected bus handle all stage dispatches go through.
    fn dispatcher(&self) -> &Arc<Dispatcher>;

    /// Dispatch the `started` stage of `factory`.
    fn started<S, D, F, I, M>(
        &self,
        factory: &AsyncActionFactory<S, D, F, I, M>,
        data: S,
        metadata: Option<M>,
    ) where
        S: Send + Sync + 'static,
        D: Send + Sync + 'static,
        F: Send + Sync + 'static,
        I: Send + Sync + 'static,
        M: Send + Sync + 'static,
    {
        self.dispatcher().dispatch(factory.started.make_opt(data, metadata));
    }

    /// Dispatch the `success` stage of `factory`.
    fn success<S, D, F, I, M>(
        &self,
        factory: &AsyncActionFactory<S, D, F, I, M>,
        data: D,
        metadata: Option<M>,
    ) where
        S: Send + Sync + 'static,
        D: Send + Sync + 'static,
        F: Send + Sync + 'static,
        I: Send + Sync + 'static,
        M: Send + Sync + 'static,
    {
        self.dispatcher().dispatch(factory.success.make_opt(data, metadata));
    }

    /// Dispatch the `failed` stage of `factory`.
    fn failed<S, D, F, I, M>(
        &self,
        factory: &AsyncActionFactory<S, D, F, I, M>,
        data: F,
        metadata: Option<M>,
    ) where
        S: Send + Sync + 'static,
        D: Send + Sync + 'static,
        F: Send + Sync + 'static,
        I: Send + Sync + 'static,
        M: Send + Sync + 'static,
    {
        self.dispatcher().dispatch(factory.failed.make_opt(data, metadata));
    }

    /// Dispatch the `invalidated` stage of `factory`.
    ///
    /// Never emitted automatically; the signal for hand-written
    /// supersession logic.
    fn invalidated<S, D, F, I, M>(
        &self,
        factory: &AsyncActionFactory<S, D, F, I, M>,
        data: I,
        metadata: Option<M>,
    ) where
        S: Send + Sync + 'static,
        D: Send + Sync + 'static,
        F: Send + Sync + 'static,
        I: Send + Sync + 'static,
        M: Send + Sync + 'static,
    {
        self.dispatcher()
            .dispatch(factory.invalidated.make_opt(data, metadata));
    }

    /// Dispatch the `done` stage of `factory`.
    fn done<S, D, F, I, M>(
        &self,
        factory: &AsyncActionFactory<S, D, F, I, M>,
        data: S,
        metadata: Option<M>,
    ) where
        S: Send + Sync + 'static,
        D: Send + Sync + 'static,
        F: Send + Sync + 'static,
        I: Send + Sync + 'static,
        M: Send + Sync + 'static,
    {
        self.dispatcher().dispatch(factory.done.make_opt(data, metadata));
    }

    /// Run one asynchronous operation and emit its full lifecycle.
    ///
    /// 1. Dispatches `started` synchronously, before `body` is polled, so
    ///    subscribers observe "work began" ahead of any await point.
    /// 2. Spawns `body` on the tokio runtime; the caller is never suspended
    ///    and gets no return value. All observation happens through
    ///    dispatched actions.
    /// 3. When the body settles: `Ok(v)` dispatches `success` with `v`,
    ///    `Err(e)` dispatches `failed` with `e`, exactly one of the two.
    /// 4. Unconditionally dispatches `done` afterwards.
    ///
    /// `invalidated` is never emitted here. Concurrent invocations for the
    /// same factory are independent and unordered relative to each other;
    /// there is no de-duplication and no cancellation of in-flight calls.
    ///
    /// The error path converts the body's error into data (the `failed`
    /// payload); it never propagates to this method's caller. A panicking
    /// bus listener, by contrast, is not caught and aborts the spawned
    /// stage task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    fn try_catch<D, M, Fut>(
        &self,
        factory: &AsyncOpFactory<D, M>,
        body: Fut,
        metadata: Option<M>,
    ) where
        D: Send + Sync + 'static,
        M: Clone + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<D>> + Send + 'static,
    {
        let dispatcher = Arc::clone(self.dispatcher());
        let kind = factory.kind().clone();

        tracing::debug!(kind = %kind, "async operation starting");
        dispatcher.dispatch(factory.started.make_opt((), metadata.clone()));

        let success = factory.success.clone();
        let failed = factory.failed.clone();
        let done = factory.done.clone();

        tokio::spawn(async move {
            match body.await {
                Ok(value) => {
                    metrics::counter!("creator.operations", "outcome" => "success").increment(1);
                    dispatcher.dispatch(success.make_opt(value, metadata.clone()));
                },
                Err(error) => {
                    tracing::debug!(kind = %kind, error = %error, "async operation failed");
                    metrics::counter!("creator.operations", "outcome" => "failed").increment(1);
                    dispatcher.dispatch(failed.make_opt(error, metadata.clone()));
                },
            }
            dispatcher.dispatch(done.make_opt((), metadata));
        });
    }
}
