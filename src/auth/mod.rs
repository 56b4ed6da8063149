// Public API
pub use authenticator::{Authenticator, JwtAuthenticator};
pub use models::{AuthClaims, DjModel, UserIdentity};
pub use repository::{DjRepository, InMemoryDjRepository};
pub use token::TokenConfig;

// Internal modules
mod authenticator;
mod models;
mod repository;
mod token;
