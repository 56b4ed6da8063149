use airwave::auth::{InMemoryDjRepository, JwtAuthenticator, TokenConfig};
use airwave::event::InMemoryEventStore;
use airwave::program::{handlers as program_handlers, InMemoryProgramStore};
use airwave::shared::AppState;
use airwave::websockets::websocket_handler;
use axum::{
    http::HeaderValue,
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// All inbound client events are processed on one logical thread; the router
// only suspends while awaiting the stores, so per-event persist-then-broadcast
// ordering holds without locking beyond the registry's own.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airwave=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting airwave live-room server");

    // Shared application state with dependency injection; swap the in-memory
    // stores for database-backed implementations in production
    let authenticator = Arc::new(JwtAuthenticator::new(
        TokenConfig::new(),
        Arc::new(InMemoryDjRepository::new()),
    ));
    let program_store = Arc::new(InMemoryProgramStore::new());
    let event_store = Arc::new(InMemoryEventStore::new());

    let app_state = AppState::new(authenticator, program_store, event_store);

    let cors = match std::env::var("FRONTEND_URL")
        .ok()
        .and_then(|url| url.parse::<HeaderValue>().ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
        None => CorsLayer::permissive(),
    };

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .route("/programs", get(program_handlers::list_programs))
        .route("/programs/:id", get(program_handlers::get_program))
        .route(
            "/programs/:id/status",
            patch(program_handlers::set_program_status),
        )
        .route(
            "/programs/:id/events",
            get(program_handlers::list_program_events),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind listener");
    info!(addr = %bind_addr, "Server running");
    axum::serve(listener, app).await.expect("server error");
}
