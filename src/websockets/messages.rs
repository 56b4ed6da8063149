use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserIdentity;
use crate::event::{EventKind, PersistedEvent};
use crate::program::{ProgramModel, ProgramStatus};
use crate::shared::AppError;

/// Message types for WebSocket communication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    // Client -> Server
    EnterRoom,
    LeaveRoom,

    // Both directions: client submission in, canonical persisted echo out
    ChatMessage,
    Reaction,
    Gift,

    // Server -> Room
    MemberJoined,
    MemberLeft,
    Follow,

    // Server -> Global
    ProgramStatus,

    // Server -> Originating session only
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterRoomPayload {
    pub room_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomPayload {
    pub room_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub room_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionPayload {
    pub room_id: String,
    pub reaction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftPayload {
    pub room_id: String,
    pub gift_type: String,
    pub value: f64,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberPayload {
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEventPayload {
    pub event: PersistedEvent,
    pub actor: MemberPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramStatusPayload {
    pub program_id: String,
    pub status: ProgramStatus,
    pub owner: UserIdentity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: String,
    pub message: String,
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    /// Create a MEMBER_JOINED notification
    pub fn member_joined(identity: &UserIdentity) -> Self {
        let payload = MemberPayload {
            name: identity.name.clone(),
            avatar: identity.avatar.clone(),
        };
        Self::new(
            MessageType::MemberJoined,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a MEMBER_LEFT notification
    pub fn member_left(identity: &UserIdentity) -> Self {
        let payload = MemberPayload {
            name: identity.name.clone(),
            avatar: identity.avatar.clone(),
        };
        Self::new(
            MessageType::MemberLeft,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create the canonical room echo of a persisted event, typed by its kind
    pub fn room_event(event: &PersistedEvent) -> Self {
        let message_type = match event.kind {
            EventKind::Chat => MessageType::ChatMessage,
            EventKind::Reaction => MessageType::Reaction,
            EventKind::Gift => MessageType::Gift,
            EventKind::Follow => MessageType::Follow,
        };
        let payload = RoomEventPayload {
            actor: MemberPayload {
                name: event.actor.name.clone(),
                avatar: event.actor.avatar.clone(),
            },
            event: event.clone(),
        };
        Self::new(message_type, serde_json::to_value(payload).unwrap())
    }

    /// Create a PROGRAM_STATUS broadcast from a store-confirmed program
    pub fn program_status(program: &ProgramModel) -> Self {
        let payload = ProgramStatusPayload {
            program_id: program.id.clone(),
            status: program.status,
            owner: program.owner.clone(),
        };
        Self::new(
            MessageType::ProgramStatus,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create an ERROR acknowledgment for the originating session
    pub fn error(error: &AppError) -> Self {
        let payload = ErrorPayload {
            kind: error.kind().to_string(),
            message: error.to_string(),
        };
        Self::new(MessageType::Error, serde_json::to_value(payload).unwrap())
    }

    /// Serialize for the wire; messages are built from serializable payloads
    /// so this only fails on pathological float values
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}
