//! Integration tests for the action-creator lifecycle orchestration.
//!
//! Covers lifecycle completeness on both outcomes, single-dispatch stage
//! methods and the independence of concurrent invocations.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use actionflow_core::action::{Action, ActionKind, ActionStatus};
use actionflow_core::dispatcher::Dispatcher;
use actionflow_core::subject::Listener;
use actionflow_runtime::{ActionCreator, AsyncOpFactory};
use actionflow_testing::{ActionRecorder, wait_until};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

struct TestCreator {
    dispatcher: Arc<Dispatcher>,
}

impl ActionCreator for TestCreator {
    fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

fn harness(kind: &str) -> (Arc<Dispatcher>, TestCreator, ActionRecorder, AsyncOpFactory<u32>) {
    let dispatcher = Arc::new(Dispatcher::new());
    let recorder = ActionRecorder::new();
    dispatcher.add_listener(recorder.listener());

    let creator = TestCreator {
        dispatcher: Arc::clone(&dispatcher),
    };
    let factory = AsyncOpFactory::new(ActionKind::new(kind));
    (dispatcher, creator, recorder, factory)
}

async fn wait_for_done(recorder: &ActionRecorder, kind: &ActionKind, done_count: usize) {
    let observed = wait_until(Duration::from_secs(2), || {
        recorder
            .statuses_for(kind)
            .iter()
            .filter(|status| **status == ActionStatus::Done)
            .count()
            >= done_count
    })
    .await;
    assert!(observed, "timed out waiting for {done_count} done action(s)");
}

// ============================================================================
// Lifecycle completeness
// ============================================================================

#[tokio::test]
async fn successful_body_emits_started_success_done() {
    let (_dispatcher, creator, recorder, factory) = harness("fetch");

    creator.try_catch(&factory, async { Ok(7) }, None);
    wait_for_done(&recorder, factory.kind(), 1).await;

    assert_eq!(
        recorder.statuses_for(factory.kind()),
        vec![
            ActionStatus::Started,
            ActionStatus::Success,
            ActionStatus::Done,
        ]
    );
}

#[tokio::test]
async fn failing_body_emits_started_failed_done() {
    let (_dispatcher, creator, recorder, factory) = harness("fetch");

    creator.try_catch(
        &factory,
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(anyhow::anyhow!("boom"))
        },
        None,
    );
    wait_for_done(&recorder, factory.kind(), 1).await;

    assert_eq!(
        recorder.statuses_for(factory.kind()),
        vec![
            ActionStatus::Started,
            ActionStatus::Failed,
            ActionStatus::Done,
        ]
    );
}

#[tokio::test]
async fn started_is_dispatched_before_try_catch_returns() {
    let (_dispatcher, creator, recorder, factory) = harness("fetch");

    creator.try_catch(
        &factory,
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(1)
        },
        None,
    );

    // No awaiting: the synchronous dispatch already happened.
    assert_eq!(
        recorder.statuses_for(factory.kind()),
        vec![ActionStatus::Started]
    );
}

#[tokio::test]
async fn error_values_become_failed_payloads() {
    let (dispatcher, creator, recorder, factory) = harness("fetch");

    let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let listener: Listener<Action> = {
        let messages = Arc::clone(&messages);
        let failed = factory.failed.clone();
        Arc::new(move |action: &Action| {
            if let Some(error) = failed.data(action) {
                messages.lock().unwrap().push(error.to_string());
            }
        })
    };
    dispatcher.add_listener(listener);

    creator.try_catch(&factory, async { Err(anyhow::anyhow!("no route")) }, None);
    wait_for_done(&recorder, factory.kind(), 1).await;

    assert_eq!(*messages.lock().unwrap(), vec!["no route".to_string()]);
}

#[tokio::test]
async fn metadata_rides_along_every_stage() {
    let dispatcher = Arc::new(Dispatcher::new());
    let recorder = ActionRecorder::new();
    dispatcher.add_listener(recorder.listener());
    let creator = TestCreator {
        dispatcher: Arc::clone(&dispatcher),
    };

    let factory: AsyncOpFactory<u32, &'static str> =
        AsyncOpFactory::new(ActionKind::new("tagged"));

    let tags: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let listener: Listener<Action> = {
        let tags = Arc::clone(&tags);
        let started = factory.started.clone();
        let success = factory.success.clone();
        let done = factory.done.clone();
        Arc::new(move |action: &Action| {
            if let Some(tag) = started.metadata(action) {
                tags.lock().unwrap().push(*tag);
            }
            if let Some(tag) = success.metadata(action) {
                tags.lock().unwrap().push(*tag);
            }
            if let Some(tag) = done.metadata(action) {
                tags.lock().unwrap().push(*tag);
            }
        })
    };
    dispatcher.add_listener(listener);

    creator.try_catch(&factory, async { Ok(5) }, Some("req-1"));
    wait_for_done(&recorder, factory.kind(), 1).await;

    assert_eq!(*tags.lock().unwrap(), vec!["req-1", "req-1", "req-1"]);
}

// ============================================================================
// Stage methods
// ============================================================================

#[tokio::test]
async fn stage_methods_dispatch_exactly_once() {
    let (_dispatcher, creator, recorder, factory) = harness("manual");

    creator.started(&factory, (), None);
    assert_eq!(recorder.len(), 1);

    creator.success(&factory, 3, None);
    assert_eq!(recorder.len(), 2);

    creator.failed(&factory, anyhow::anyhow!("manual failure"), None);
    assert_eq!(recorder.len(), 3);

    creator.invalidated(&factory, (), None);
    assert_eq!(recorder.len(), 4);

    creator.done(&factory, (), None);
    assert_eq!(recorder.len(), 5);

    assert_eq!(
        recorder.statuses_for(factory.kind()),
        vec![
            ActionStatus::Started,
            ActionStatus::Success,
            ActionStatus::Failed,
            ActionStatus::Invalidated,
            ActionStatus::Done,
        ]
    );
}

// ============================================================================
// Concurrent invocations
// ============================================================================

#[tokio::test]
async fn concurrent_invocations_stay_independent() {
    let (dispatcher, creator, recorder, factory) = harness("concurrent");

    let successes: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let failures: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let listener: Listener<Action> = {
        let successes = Arc::clone(&successes);
        let failures = Arc::clone(&failures);
        let success = factory.success.clone();
        let failed = factory.failed.clone();
        Arc::new(move |action: &Action| {
            if let Some(value) = success.data(action) {
                successes.lock().unwrap().push(*value);
            } else if let Some(error) = failed.data(action) {
                failures.lock().unwrap().push(error.to_string());
            }
        })
    };
    dispatcher.add_listener(listener);

    // Back to back on the same factory: the slower one resolves, the
    // faster one rejects.
    creator.try_catch(
        &factory,
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(41)
        },
        None,
    );
    creator.try_catch(
        &factory,
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(anyhow::anyhow!("second call rejected"))
        },
        None,
    );

    wait_for_done(&recorder, factory.kind(), 2).await;

    let statuses = recorder.statuses_for(factory.kind());
    let count = |wanted: ActionStatus| statuses.iter().filter(|s| **s == wanted).count();
    assert_eq!(count(ActionStatus::Started), 2);
    assert_eq!(count(ActionStatus::Success), 1);
    assert_eq!(count(ActionStatus::Failed), 1);
    assert_eq!(count(ActionStatus::Done), 2);

    // No payload cross-contamination between the two invocations.
    assert_eq!(*successes.lock().unwrap(), vec![41]);
    assert_eq!(
        *failures.lock().unwrap(),
        vec!["second call rejected".to_string()]
    );
}

#[tokio::test]
async fn kinds_do_not_bleed_between_factories() {
    let dispatcher = Arc::new(Dispatcher::new());
    let recorder = ActionRecorder::new();
    dispatcher.add_listener(recorder.listener());
    let creator = TestCreator {
        dispatcher: Arc::clone(&dispatcher),
    };

    let fetch: AsyncOpFactory<u32> = AsyncOpFactory::new(ActionKind::new("fetch"));
    let save: AsyncOpFactory<u32> = AsyncOpFactory::new(ActionKind::new("save"));

    creator.try_catch(&fetch, async { Ok(1) }, None);
    creator.try_catch(&save, async { Err(anyhow::anyhow!("save failed")) }, None);

    wait_for_done(&recorder, fetch.kind(), 1).await;
    wait_for_done(&recorder, save.kind(), 1).await;

    assert_eq!(
        recorder.statuses_for(fetch.kind()),
        vec![
            ActionStatus::Started,
            ActionStatus::Success,
            ActionStatus::Done,
        ]
    );
    assert_eq!(
        recorder.statuses_for(save.kind()),
        vec![
            ActionStatus::Started,
            ActionStatus::Failed,
            ActionStatus::Done,
        ]
    );
}
