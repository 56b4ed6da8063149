// Public API
pub use handler::{websocket_handler, LiveMessageHandler};
pub use messages::{MessageType, WebSocketMessage};
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};

// Internal modules
mod handler;
pub mod messages;
mod socket;
