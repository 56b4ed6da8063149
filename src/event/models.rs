use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserIdentity;

/// Kinds of user-generated occurrences tied to a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Chat,
    Reaction,
    Gift,
    Follow,
}

/// Kind-specific event content
///
/// The payload is a tagged variant, so its shape can never disagree with
/// the event kind: a chat event carries a message, never a gift amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    Chat {
        message: String,
    },
    Reaction {
        reaction: String,
    },
    #[serde(rename_all = "camelCase")]
    Gift {
        gift_type: String,
        value: f64,
    },
    Follow,
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Chat { .. } => EventKind::Chat,
            EventPayload::Reaction { .. } => EventKind::Reaction,
            EventPayload::Gift { .. } => EventKind::Gift,
            EventPayload::Follow => EventKind::Follow,
        }
    }
}

/// Actor identity captured at event time, not live-looked-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

impl From<&UserIdentity> for ActorSnapshot {
    fn from(identity: &UserIdentity) -> Self {
        Self {
            id: identity.id.clone(),
            name: identity.name.clone(),
            avatar: identity.avatar.clone(),
        }
    }
}

/// Canonical event record as returned by the store, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEvent {
    pub id: String,
    pub kind: EventKind,
    pub program_id: String,
    pub actor: ActorSnapshot,
    pub payload: EventPayload,
    pub timestamp: DateTime<Utc>,
}

/// One page of a program's event history, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPage {
    pub events: Vec<PersistedEvent>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub pages: usize,
}
