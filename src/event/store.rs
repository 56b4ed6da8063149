use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::models::{ActorSnapshot, EventPage, EventPayload, Pagination, PersistedEvent};
use crate::shared::AppError;

/// External event store boundary
///
/// The router persists every event here before broadcasting it, so clients
/// only ever see events that were durably accepted.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists a new event and returns the canonical record with the
    /// store-assigned id and timestamp
    async fn create_event(
        &self,
        program_id: &str,
        actor: ActorSnapshot,
        payload: EventPayload,
    ) -> Result<PersistedEvent, AppError>;

    /// Returns one page of a program's event history, newest first
    async fn list_events(
        &self,
        program_id: &str,
        page: usize,
        limit: usize,
    ) -> Result<EventPage, AppError>;
}

/// In-memory implementation of EventStore for development and testing
pub struct InMemoryEventStore {
    events: Mutex<Vec<PersistedEvent>>,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Total number of stored events, across all programs
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    #[instrument(skip(self, actor, payload))]
    async fn create_event(
        &self,
        program_id: &str,
        actor: ActorSnapshot,
        payload: EventPayload,
    ) -> Result<PersistedEvent, AppError> {
        let event = PersistedEvent {
            id: Uuid::new_v4().to_string(),
            kind: payload.kind(),
            program_id: program_id.to_string(),
            actor,
            payload,
            timestamp: Utc::now(),
        };

        let mut events = self.events.lock().unwrap();
        events.push(event.clone());

        debug!(
            event_id = %event.id,
            program_id = %program_id,
            kind = ?event.kind,
            "Event persisted in memory"
        );
        Ok(event)
    }

    #[instrument(skip(self))]
    async fn list_events(
        &self,
        program_id: &str,
        page: usize,
        limit: usize,
    ) -> Result<EventPage, AppError> {
        let page = page.max(1);
        let limit = limit.max(1);

        let events = self.events.lock().unwrap();
        let mut matching: Vec<PersistedEvent> = events
            .iter()
            .filter(|e| e.program_id == program_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let total = matching.len();
        let pages = total.div_ceil(limit);
        let events: Vec<PersistedEvent> = matching
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();

        Ok(EventPage {
            events,
            pagination: Pagination {
                total,
                page,
                limit,
                pages,
            },
        })
    }
}
