// Public API
pub use models::{ActorSnapshot, EventKind, EventPage, EventPayload, Pagination, PersistedEvent};
pub use store::{EventStore, InMemoryEventStore};

// Internal modules
mod models;
mod store;
