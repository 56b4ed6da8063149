use async_trait::async_trait;

use airwave::event::{ActorSnapshot, EventPage, EventPayload, EventStore, Pagination, PersistedEvent};
use airwave::shared::AppError;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Event store whose writes always fail, simulating an unavailable backend
pub struct FailingEventStore;

#[async_trait]
impl EventStore for FailingEventStore {
    async fn create_event(
        &self,
        _program_id: &str,
        _actor: ActorSnapshot,
        _payload: EventPayload,
    ) -> Result<PersistedEvent, AppError> {
        Err(AppError::Persistence("store unavailable".to_string()))
    }

    async fn list_events(
        &self,
        _program_id: &str,
        page: usize,
        limit: usize,
    ) -> Result<EventPage, AppError> {
        Ok(EventPage {
            events: vec![],
            pagination: Pagination {
                total: 0,
                page,
                limit,
                pages: 0,
            },
        })
    }
}
