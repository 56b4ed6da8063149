use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use airwave::auth::UserIdentity;
use airwave::event::{EventStore, InMemoryEventStore};
use airwave::program::{InMemoryProgramStore, ProgramModel, ProgramStatus, ProgramStore};
use airwave::registry::{RoomRegistry, SessionHandle};
use airwave::router::LiveEventRouter;
use airwave::websockets::WebSocketMessage;
use chrono::Utc;

pub mod mocks;

pub use mocks::*;

/// Everything a live-room scenario needs, wired the way the server wires it
pub struct TestSetup {
    pub registry: Arc<RoomRegistry>,
    pub router: LiveEventRouter,
    pub event_store: Arc<InMemoryEventStore>,
    pub program_store: Arc<InMemoryProgramStore>,
}

impl TestSetup {
    pub fn new() -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let event_store = Arc::new(InMemoryEventStore::new());
        let program_store = Arc::new(InMemoryProgramStore::new());
        let router = LiveEventRouter::new(
            registry.clone(),
            event_store.clone(),
            program_store.clone(),
        );
        Self {
            registry,
            router,
            event_store,
            program_store,
        }
    }

    /// Variant with a failing event store, for persistence failure scenarios
    pub fn with_failing_event_store() -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let event_store = Arc::new(InMemoryEventStore::new());
        let program_store = Arc::new(InMemoryProgramStore::new());
        let failing: Arc<dyn EventStore> = Arc::new(FailingEventStore);
        let router = LiveEventRouter::new(registry.clone(), failing, program_store.clone());
        Self {
            registry,
            router,
            event_store,
            program_store,
        }
    }

    /// Registers an authenticated session, as the handshake handler would
    pub async fn connect(&self, name: &str) -> (Arc<SessionHandle>, UnboundedReceiver<String>) {
        let (session, receiver) = SessionHandle::connect(identity(name));
        self.registry.register(session.clone()).await;
        (session, receiver)
    }

    pub async fn seed_program(&self, id: &str, owner: &str, status: ProgramStatus) {
        self.program_store
            .create_program(&program(id, owner, status))
            .await
            .unwrap();
    }
}

impl Default for TestSetup {
    fn default() -> Self {
        Self::new()
    }
}

pub fn identity(name: &str) -> UserIdentity {
    UserIdentity {
        id: format!("dj-{}", name),
        name: name.to_string(),
        avatar: format!("{}.png", name),
    }
}

pub fn program(id: &str, owner: &str, status: ProgramStatus) -> ProgramModel {
    ProgramModel {
        id: id.to_string(),
        owner: identity(owner),
        title: format!("show {}", id),
        description: None,
        status,
        starts_at: Utc::now(),
    }
}

/// Collects every message currently queued on a session's outbound channel
pub fn drain(receiver: &mut UnboundedReceiver<String>) -> Vec<WebSocketMessage> {
    let mut messages = Vec::new();
    while let Ok(raw) = receiver.try_recv() {
        messages.push(serde_json::from_str(&raw).unwrap());
    }
    messages
}
