//! End-to-end tests for the entity feed demo.
//!
//! These exercise the full path: creator → dispatcher → store → store
//! listeners, with the fake api standing in for a server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use actionflow_core::dispatcher::Dispatcher;
use actionflow_testing::{EventRecorder, wait_until};
use entity_feed::{
    ENTITY_ACTIONS, Entity, EntityActionCreator, EntityEvent, FakeApi, entity_store,
};
use std::sync::Arc;
use std::time::Duration;

fn hey() -> Entity {
    Entity {
        id: 1,
        title: "Hey".to_string(),
        liked: false,
    }
}

async fn wait_for_loading_ended(recorder: &EventRecorder<EntityEvent>, count: usize) {
    let observed = wait_until(Duration::from_secs(2), || {
        recorder
            .events()
            .iter()
            .filter(|event| **event == EntityEvent::LoadingEnded)
            .count()
            >= count
    })
    .await;
    assert!(observed, "timed out waiting for {count} LoadingEnded event(s)");
}

#[tokio::test]
async fn get_entities_fills_the_store() {
    let dispatcher = Arc::new(Dispatcher::new());
    let store = entity_store(Arc::clone(&dispatcher));
    let recorder = EventRecorder::new();
    store.add_listener(recorder.listener());

    let api = Arc::new(FakeApi::seeded(vec![hey()]).with_max_delay(Duration::from_millis(30)));
    let creator = EntityActionCreator::new(Arc::clone(&dispatcher), api);

    creator.get_entities();
    wait_for_loading_ended(&recorder, 1).await;

    // The store's list equals exactly what the provider resolved to.
    assert_eq!(store.state(Clone::clone), vec![hey()]);

    // EntitiesChanged fired exactly once, bracketed by the loading flags.
    let events = recorder.events();
    assert_eq!(
        events,
        vec![
            EntityEvent::LoadingStarted,
            EntityEvent::EntitiesChanged,
            EntityEvent::LoadingEnded,
        ]
    );
}

#[tokio::test]
async fn created_entities_are_appended() {
    let dispatcher = Arc::new(Dispatcher::new());
    let store = entity_store(Arc::clone(&dispatcher));
    let recorder = EventRecorder::new();
    store.add_listener(recorder.listener());

    let api = Arc::new(
        FakeApi::seeded(Vec::new())
            .with_failure_chance(0.0)
            .with_max_delay(Duration::from_millis(30)),
    );
    let creator = EntityActionCreator::new(Arc::clone(&dispatcher), api);

    creator.create_entity();
    wait_for_loading_ended(&recorder, 1).await;

    assert_eq!(store.state(Vec::len), 1);
    assert_eq!(
        recorder.events(),
        vec![
            EntityEvent::LoadingStarted,
            EntityEvent::EntityAdded,
            EntityEvent::LoadingEnded,
        ]
    );
}

#[tokio::test]
async fn failed_creation_reports_an_error_event() {
    let dispatcher = Arc::new(Dispatcher::new());
    let store = entity_store(Arc::clone(&dispatcher));
    let recorder = EventRecorder::new();
    store.add_listener(recorder.listener());

    let api = Arc::new(
        FakeApi::seeded(Vec::new())
            .with_failure_chance(1.0)
            .with_max_delay(Duration::from_millis(30)),
    );
    let creator = EntityActionCreator::new(Arc::clone(&dispatcher), api);

    creator.create_entity();
    wait_for_loading_ended(&recorder, 1).await;

    assert!(store.state(Vec::is_empty));
    assert_eq!(
        recorder.events(),
        vec![
            EntityEvent::LoadingStarted,
            EntityEvent::EntityAddError("it failed!".to_string()),
            EntityEvent::LoadingEnded,
        ]
    );
}

#[tokio::test]
async fn fetch_then_create_compose() {
    let dispatcher = Arc::new(Dispatcher::new());
    let store = entity_store(Arc::clone(&dispatcher));
    let recorder = EventRecorder::new();
    store.add_listener(recorder.listener());

    let api = Arc::new(
        FakeApi::seeded(vec![hey()])
            .with_failure_chance(0.0)
            .with_max_delay(Duration::from_millis(30)),
    );
    let creator = EntityActionCreator::new(Arc::clone(&dispatcher), api);

    creator.get_entities();
    wait_for_loading_ended(&recorder, 1).await;
    creator.create_entity();
    wait_for_loading_ended(&recorder, 2).await;

    let events = recorder.events();
    let count = |wanted: &EntityEvent| events.iter().filter(|e| *e == wanted).count();
    assert_eq!(count(&EntityEvent::LoadingStarted), 2);
    assert_eq!(count(&EntityEvent::LoadingEnded), 2);
    assert_eq!(count(&EntityEvent::EntityAdded), 1);
    assert_eq!(count(&EntityEvent::EntitiesChanged), 1);

    // The fetched entity survived the fetch and the created one was
    // appended after it.
    let entities = store.state(Clone::clone);
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0], hey());
}

#[tokio::test]
async fn torn_down_store_ignores_late_results() {
    let dispatcher = Arc::new(Dispatcher::new());
    let store = entity_store(Arc::clone(&dispatcher));
    let recorder = EventRecorder::new();
    store.add_listener(recorder.listener());

    let api = Arc::new(FakeApi::seeded(vec![hey()]).with_max_delay(Duration::from_millis(30)));
    let creator = EntityActionCreator::new(Arc::clone(&dispatcher), api);

    store.tear_down().unwrap();
    creator.get_entities();

    // Give the lifecycle time to finish; nothing may arrive.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(store.state(Vec::is_empty));
    assert!(recorder.is_empty());
}

#[tokio::test]
async fn fetch_metadata_is_observable_on_the_bus() {
    let dispatcher = Arc::new(Dispatcher::new());
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

    let listener: actionflow_core::subject::Listener<actionflow_core::action::Action> = {
        let seen = Arc::clone(&seen);
        Arc::new(move |action| {
            if let Some(note) = ENTITY_ACTIONS.get_entities.started.metadata(action) {
                seen.lock().unwrap().push(note.message.clone());
            }
        })
    };
    dispatcher.add_listener(listener);

    let api = Arc::new(FakeApi::seeded(Vec::new()).with_max_delay(Duration::ZERO));
    let creator = EntityActionCreator::new(Arc::clone(&dispatcher), api);
    creator.get_entities();

    // Started metadata is dispatched synchronously.
    assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
}
