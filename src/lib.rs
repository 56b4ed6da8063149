// Library crate for the airwave live-room server
// This file exposes the public API for integration tests

pub mod auth;
pub mod event;
pub mod program;
pub mod registry;
pub mod router;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use auth::{Authenticator, DjModel, JwtAuthenticator, TokenConfig, UserIdentity};
pub use event::{EventKind, EventPayload, EventStore, PersistedEvent};
pub use program::{ProgramModel, ProgramStatus, ProgramStore};
pub use registry::{RoomRegistry, SessionHandle};
pub use router::LiveEventRouter;
pub use shared::{AppError, AppState};
pub use websockets::{MessageType, WebSocketMessage};
