use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::Authenticator;
use crate::event::EventStore;
use crate::program::ProgramStore;
use crate::registry::RoomRegistry;
use crate::router::LiveEventRouter;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<dyn Authenticator>,
    pub registry: Arc<RoomRegistry>,
    pub router: Arc<LiveEventRouter>,
    pub program_store: Arc<dyn ProgramStore>,
    pub event_store: Arc<dyn EventStore>,
}

impl AppState {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        program_store: Arc<dyn ProgramStore>,
        event_store: Arc<dyn EventStore>,
    ) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let router = Arc::new(LiveEventRouter::new(
            registry.clone(),
            event_store.clone(),
            program_store.clone(),
        ));

        Self {
            authenticator,
            registry,
            router,
            program_store,
            event_store,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Failure kind surfaced to the originating session in ERROR acknowledgments
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::JwtError(_) | AppError::Unauthorized(_) => "authentication",
            AppError::Validation(_) => "validation",
            AppError::Persistence(_) => "persistence",
            AppError::NotFound(_) => "not_found",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::JwtError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Persistence(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Persistence error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
