//! Entity feed demo binary
//!
//! Wires a dispatcher, an entity store and an entity action creator
//! together, fires a few operations and prints the store events a UI
//! would normally render.

use entity_feed::{EntityActionCreator, EntityEvent, FakeApi, entity_store};

use actionflow_core::dispatcher::Dispatcher;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "entity_feed=debug,actionflow_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Entity Feed: actionflow demo ===\n");

    // One bus for the whole process, injected by handle.
    let dispatcher = Arc::new(Dispatcher::new());

    let store = entity_store(Arc::clone(&dispatcher));
    store.add_listener(Arc::new(|event: &EntityEvent| {
        println!("  store event: {event:?}");
    }));

    let api = Arc::new(FakeApi::new());
    let creator = EntityActionCreator::new(Arc::clone(&dispatcher), api);

    println!(">>> get_entities");
    creator.get_entities();
    tokio::time::sleep(Duration::from_millis(700)).await;
    println!("entities: {:?}\n", store.state(Clone::clone));

    println!(">>> create_entity (the fake api fails one in five)");
    creator.create_entity();
    creator.create_entity();
    tokio::time::sleep(Duration::from_millis(700)).await;
    println!("entities: {:?}\n", store.state(Clone::clone));

    println!(">>> tear_down");
    if let Err(error) = store.tear_down() {
        eprintln!("teardown failed: {error}");
    }

    // After teardown the store is deaf: no further events print.
    creator.get_entities();
    tokio::time::sleep(Duration::from_millis(700)).await;
    println!("entities after teardown: {:?}", store.state(Clone::clone));

    println!("\n=== demo complete ===");
}
