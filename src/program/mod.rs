// Public API
pub use models::{ProgramModel, ProgramStatus};
pub use store::{InMemoryProgramStore, ProgramStore};

// HTTP handlers
pub mod handlers;

// Internal modules
mod models;
mod store;
