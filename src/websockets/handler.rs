use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{Authenticator, UserIdentity};
use crate::registry::SessionHandle;
use crate::router::LiveEventRouter;
use crate::shared::{AppError, AppState};
use crate::websockets::messages::{
    ChatMessagePayload, EnterRoomPayload, GiftPayload, LeaveRoomPayload, MessageType,
    ReactionPayload, WebSocketMessage,
};

use super::socket::{Connection, MessageHandler};

/// Message handler wiring inbound WebSocket messages to router operations
///
/// Failures are converted to an ERROR acknowledgment sent back on the
/// originating session's channel only; nothing is broadcast and the
/// connection stays up.
pub struct LiveMessageHandler {
    router: Arc<LiveEventRouter>,
}

impl LiveMessageHandler {
    pub fn new(router: Arc<LiveEventRouter>) -> Self {
        Self { router }
    }

    async fn dispatch(
        &self,
        session: &Arc<SessionHandle>,
        ws_message: WebSocketMessage,
    ) -> Result<(), AppError> {
        match ws_message.message_type {
            MessageType::EnterRoom => {
                let payload: EnterRoomPayload = parse_payload(ws_message.payload)?;
                self.router.enter_room(session, &payload.room_id).await;
                Ok(())
            }
            MessageType::LeaveRoom => {
                let payload: LeaveRoomPayload = parse_payload(ws_message.payload)?;
                self.router.leave_room(session, &payload.room_id).await;
                Ok(())
            }
            MessageType::ChatMessage => {
                let payload: ChatMessagePayload = parse_payload(ws_message.payload)?;
                self.router
                    .submit_chat(session, &payload.room_id, &payload.message)
                    .await
            }
            MessageType::Reaction => {
                let payload: ReactionPayload = parse_payload(ws_message.payload)?;
                self.router
                    .submit_reaction(session, &payload.room_id, &payload.reaction)
                    .await
            }
            MessageType::Gift => {
                let payload: GiftPayload = parse_payload(ws_message.payload)?;
                self.router
                    .submit_gift(
                        session,
                        &payload.room_id,
                        &payload.gift_type,
                        payload.value,
                    )
                    .await
            }
            _ => Err(AppError::Validation(
                "message type is not a client action".to_string(),
            )),
        }
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Validation(format!("malformed payload: {}", e)))
}

#[async_trait]
impl MessageHandler for LiveMessageHandler {
    async fn handle_message(&self, session: &Arc<SessionHandle>, message: String) {
        let ws_message = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(
                    session_id = %session.id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                let error = AppError::Validation(format!("malformed message: {}", e));
                send_error(session, &error);
                return;
            }
        };

        if let Err(error) = self.dispatch(session, ws_message).await {
            warn!(
                session_id = %session.id,
                kind = error.kind(),
                error = %error,
                "Client action failed"
            );
            send_error(session, &error);
        }
    }
}

fn send_error(session: &Arc<SessionHandle>, error: &AppError) {
    if let Some(json) = WebSocketMessage::error(error).to_json() {
        session.send(&json);
    }
}

/// WebSocket endpoint; the credential travels in the Sec-WebSocket-Protocol
/// header and is verified before the upgrade
///
/// GET /ws. A missing or invalid credential terminates the connection here,
/// before any room operation is possible.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let identity = authenticate_handshake(&headers, &app_state).await?;

    info!(
        user_id = %identity.id,
        user = %identity.name,
        "WebSocket authentication successful"
    );

    Ok(ws.on_upgrade(move |socket| handle_websocket_connection(socket, identity, app_state)))
}

/// Verifies the handshake credential; no session state exists until this
/// succeeds
async fn authenticate_handshake(
    headers: &HeaderMap,
    app_state: &AppState,
) -> Result<UserIdentity, AppError> {
    let credential = headers
        .get("sec-websocket-protocol")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing or invalid Sec-WebSocket-Protocol header");
            AppError::Unauthorized("Missing authentication credential".to_string())
        })?;

    app_state.authenticator.verify(credential).await
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    identity: UserIdentity,
    app_state: AppState,
) {
    let (session, outbound_receiver) = SessionHandle::connect(identity);

    info!(
        session_id = %session.id,
        user = %session.identity.name,
        "WebSocket connection established"
    );

    app_state.registry.register(session.clone()).await;

    let message_handler = Arc::new(LiveMessageHandler::new(app_state.router.clone()));

    let connection = Connection::new(
        session.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => {
            info!(
                session_id = %session.id,
                user = %session.identity.name,
                "WebSocket connection closed cleanly"
            );
        }
        Err(e) => {
            warn!(
                session_id = %session.id,
                user = %session.identity.name,
                error = ?e,
                "WebSocket connection error"
            );
        }
    }

    // Cleanup: membership teardown notifies remaining room members
    app_state.router.disconnect(&session.id).await;

    info!(
        session_id = %session.id,
        user = %session.identity.name,
        "Session cleaned up after disconnect"
    );
}
