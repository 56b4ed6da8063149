use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{models::UserIdentity, repository::DjRepository, token::TokenConfig};
use crate::shared::AppError;

/// Maps a connection credential to a user identity
///
/// Verification happens exactly once per connection, at handshake time.
/// Failure terminates the connection before any room operation is possible.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<UserIdentity, AppError>;
}

/// JWT-backed authenticator: validates the token signature, then resolves
/// the subject against the DJ repository
pub struct JwtAuthenticator {
    token_config: TokenConfig,
    djs: Arc<dyn DjRepository>,
}

impl JwtAuthenticator {
    pub fn new(token_config: TokenConfig, djs: Arc<dyn DjRepository>) -> Self {
        Self { token_config, djs }
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    #[instrument(skip(self, credential))]
    async fn verify(&self, credential: &str) -> Result<UserIdentity, AppError> {
        let claims = self.token_config.validate_token(credential)?;

        match self.djs.get_dj(&claims.sub).await? {
            Some(dj) => {
                info!(dj_id = %dj.id, name = %dj.name, "Credential verified");
                Ok(UserIdentity::from(&dj))
            }
            None => {
                warn!(dj_id = %claims.sub, "Credential refers to unknown DJ");
                Err(AppError::Unauthorized("DJ not found".to_string()))
            }
        }
    }
}
