//! # Entity Feed Demo
//!
//! A small entity feed exercising the actionflow core end to end:
//!
//! - [`ENTITY_ACTIONS`]: one [`AsyncOpFactory`] per operation, created once
//!   and shared by the creator and the store
//! - [`EntityActionCreator`]: fires the operations against a [`FakeApi`]
//! - [`EntityHandler`] / [`EntityStore`]: projects the lifecycle actions
//!   into [`EntityEvent`]s and the current entity list
//!
//! The UI that would normally consume the store events is out of scope;
//! the binary in `main.rs` just prints them.

use actionflow_core::action::{Action, ActionKind};
use actionflow_core::dispatcher::Dispatcher;
use actionflow_core::handler::{Events, Handler};
use actionflow_runtime::{ActionCreator, AsyncOpFactory, Store};
use rand::Rng;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::time::Duration;

/// A feed entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Stable identifier.
    pub id: u32,
    /// Display title.
    pub title: String,
    /// Whether the current user liked it.
    pub liked: bool,
}

/// Metadata side channel carried through the `getEntities` lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchNote {
    /// Free-form note supplied at dispatch time.
    pub message: String,
}

/// The action factories for the entity operations.
#[derive(Debug)]
pub struct EntityActions {
    /// Fetch the full entity list.
    pub get_entities: AsyncOpFactory<Vec<Entity>, FetchNote>,
    /// Create one new entity.
    pub create_entity: AsyncOpFactory<Entity>,
}

/// Process-wide factory bundle; both the creator and the handler match
/// against these exact factories.
pub static ENTITY_ACTIONS: LazyLock<EntityActions> = LazyLock::new(|| EntityActions {
    get_entities: AsyncOpFactory::new(ActionKind::new("getEntities")),
    create_entity: AsyncOpFactory::new(ActionKind::new("createEntity")),
});

/// Simulates talking to a server: latency, occasional failures.
#[derive(Debug)]
pub struct FakeApi {
    entities: Mutex<Vec<Entity>>,
    failure_chance: f64,
    max_delay: Duration,
}

impl FakeApi {
    /// An api seeded with the stock demo entities.
    #[must_use]
    pub fn new() -> Self {
        Self::seeded(vec![
            Entity {
                id: 1,
                title: "Hey".to_string(),
                liked: false,
            },
            Entity {
                id: 2,
                title: "You".to_string(),
                liked: true,
            },
            Entity {
                id: 3,
                title: ":D".to_string(),
                liked: false,
            },
        ])
    }

    /// An api starting from the given entity list.
    #[must_use]
    pub fn seeded(entities: Vec<Entity>) -> Self {
        Self {
            entities: Mutex::new(entities),
            failure_chance: 0.2,
            max_delay: Duration::from_millis(500),
        }
    }

    /// Set the chance that `create_entity` fails (0.0 to 1.0).
    #[must_use]
    pub const fn with_failure_chance(mut self, chance: f64) -> Self {
        self.failure_chance = chance;
        self
    }

    /// Cap the simulated latency.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// The full entity list.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` is the async-provider contract.
    pub async fn get_entities(&self) -> anyhow::Result<Vec<Entity>> {
        self.simulate_latency().await;
        Ok(self.lock().clone())
    }

    /// The entity with the given id.
    ///
    /// # Errors
    ///
    /// Fails when no entity has that id.
    pub async fn get_entity(&self, id: u32) -> anyhow::Result<Entity> {
        self.simulate_latency().await;
        self.lock()
            .iter()
            .find(|entity| entity.id == id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("entity with the id '{id}' does not exist"))
    }

    /// Create a new entity with a random id.
    ///
    /// # Errors
    ///
    /// Fails randomly according to the configured failure chance.
    pub async fn create_entity(&self) -> anyhow::Result<Entity> {
        self.simulate_latency().await;

        if rand::thread_rng().gen_bool(self.failure_chance) {
            tracing::debug!("fake backend chose to fail");
            anyhow::bail!("it failed!");
        }

        let id = rand::thread_rng().gen_range(0..10_000);
        let entity = Entity {
            id,
            title: format!("Entity with id {id}"),
            liked: false,
        };
        self.lock().push(entity.clone());
        Ok(entity)
    }

    async fn simulate_latency(&self) {
        let max_millis = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        let delay = rand::thread_rng().gen_range(0..=max_millis);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entity>> {
        self.entities.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Derived events the entity store publishes to its consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityEvent {
    /// A created entity was appended to the list.
    EntityAdded,
    /// The entity list was replaced by a fetch result.
    EntitiesChanged,
    /// Creating an entity failed, with the error rendered for display.
    EntityAddError(String),
    /// Some entity operation began.
    LoadingStarted,
    /// Some entity operation finished, either way.
    LoadingEnded,
}

/// Projects entity lifecycle actions into state changes and [`EntityEvent`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityHandler;

impl Handler for EntityHandler {
    type State = Vec<Entity>;
    type Event = EntityEvent;

    fn handle(&self, state: &mut Self::State, action: &Action) -> Events<Self::Event> {
        let actions = &*ENTITY_ACTIONS;
        let mut events = Events::new();

        if let Some(entity) = actions.create_entity.success.data(action) {
            state.push(entity.clone());
            events.push(EntityEvent::EntityAdded);
        } else if let Some(entities) = actions.get_entities.success.data(action) {
            *state = entities.clone();
            events.push(EntityEvent::EntitiesChanged);
        } else if let Some(error) = actions.create_entity.failed.data(action) {
            events.push(EntityEvent::EntityAddError(error.to_string()));
        }

        // Loading bookkeeping spans both operations, so a Success action
        // yields two events: the state change above and the flag below.
        if actions.create_entity.started.is_match(action)
            || actions.get_entities.started.is_match(action)
        {
            events.push(EntityEvent::LoadingStarted);
        } else if actions.create_entity.done.is_match(action)
            || actions.get_entities.done.is_match(action)
        {
            events.push(EntityEvent::LoadingEnded);
        }

        events
    }
}

/// The entity store type: a [`Store`] driven by [`EntityHandler`].
pub type EntityStore = Store<EntityHandler>;

/// Create an entity store registered on `dispatcher`.
#[must_use]
pub fn entity_store(dispatcher: Arc<Dispatcher>) -> EntityStore {
    Store::new(dispatcher, Vec::new(), EntityHandler)
}

/// Fires the entity operations and emits their lifecycles onto the bus.
#[derive(Debug)]
pub struct EntityActionCreator {
    dispatcher: Arc<Dispatcher>,
    api: Arc<FakeApi>,
}

impl ActionCreator for EntityActionCreator {
    fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

impl EntityActionCreator {
    /// Create a creator bound to a bus and an api.
    #[must_use]
    pub const fn new(dispatcher: Arc<Dispatcher>, api: Arc<FakeApi>) -> Self {
        Self { dispatcher, api }
    }

    /// Fetch the entity list; observe the result through the store.
    pub fn get_entities(&self) {
        let api = Arc::clone(&self.api);
        self.try_catch(
            &ENTITY_ACTIONS.get_entities,
            async move { api.get_entities().await },
            Some(FetchNote {
                message: "hello".to_string(),
            }),
        );
    }

    /// Create one entity; observe the result through the store.
    pub fn create_entity(&self) {
        let api = Arc::clone(&self.api);
        self.try_catch(
            &ENTITY_ACTIONS.create_entity,
            async move { api.create_entity().await },
            None,
        );
    }
}
