use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::UserIdentity;
use crate::websockets::messages::WebSocketMessage;

/// One authenticated, connected client
///
/// Holds the identity snapshot captured at handshake time and the outbound
/// channel feeding the connection task. Delivery is fire-and-forget: sends to
/// a closed channel are dropped, since the peer is already disconnecting.
pub struct SessionHandle {
    pub id: String,
    pub identity: UserIdentity,
    sender: mpsc::UnboundedSender<String>,
}

impl SessionHandle {
    /// Creates a session handle and the receiving half of its outbound channel
    pub fn connect(identity: UserIdentity) -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            identity,
            sender,
        });
        (handle, receiver)
    }

    pub fn send(&self, message: &str) {
        let _ = self.sender.send(message.to_string());
    }
}

/// Tracks which connected sessions belong to which program room
///
/// Membership state is only ever mutated through `join`, `leave` and
/// `drop_session`; no other component touches the maps. A session may belong
/// to several rooms at once; the registry stays general even though the
/// current UI only ever joins one.
pub struct RoomRegistry {
    /// session id -> handle, for every connected session
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
    /// room id -> member session ids
    rooms: RwLock<HashMap<String, HashSet<String>>>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a freshly authenticated session for global delivery
    pub async fn register(&self, session: Arc<SessionHandle>) {
        let mut sessions = self.sessions.write().await;
        debug!(session_id = %session.id, user = %session.identity.name, "Session registered");
        sessions.insert(session.id.clone(), session);
    }

    /// Adds the session to the room's member set
    ///
    /// Idempotent: joining a room the session is already in is a no-op and
    /// emits no notification. Existing members (not the joiner) are told that
    /// a new member arrived.
    pub async fn join(&self, session: &Arc<SessionHandle>, room_id: &str) {
        let newly_joined = {
            let mut rooms = self.rooms.write().await;
            rooms
                .entry(room_id.to_string())
                .or_default()
                .insert(session.id.clone())
        };

        if !newly_joined {
            debug!(session_id = %session.id, room_id = %room_id, "Session already in room");
            return;
        }

        info!(
            session_id = %session.id,
            room_id = %room_id,
            user = %session.identity.name,
            "Session joined room"
        );

        let message = WebSocketMessage::member_joined(&session.identity);
        self.send_to_members(room_id, &message, Some(&session.id))
            .await;
    }

    /// Removes the session from the room's member set if present
    ///
    /// Tolerates duplicate leave calls: leaving a room the session is not in
    /// is a no-op. Remaining members are told that the member left.
    pub async fn leave(&self, session: &Arc<SessionHandle>, room_id: &str) {
        let removed = {
            let mut rooms = self.rooms.write().await;
            match rooms.get_mut(room_id) {
                Some(members) => {
                    let removed = members.remove(&session.id);
                    if members.is_empty() {
                        rooms.remove(room_id);
                    }
                    removed
                }
                None => false,
            }
        };

        if !removed {
            debug!(session_id = %session.id, room_id = %room_id, "Session was not in room");
            return;
        }

        info!(
            session_id = %session.id,
            room_id = %room_id,
            user = %session.identity.name,
            "Session left room"
        );

        let message = WebSocketMessage::member_left(&session.identity);
        self.send_to_members(room_id, &message, None).await;
    }

    /// Delivers the message to every session currently in the room,
    /// including the sender, which needs the canonical persisted event too
    pub async fn broadcast(&self, room_id: &str, message: &WebSocketMessage) {
        self.send_to_members(room_id, message, None).await;
    }

    /// Delivers the message to every connected session, regardless of room
    pub async fn broadcast_global(&self, message: &WebSocketMessage) {
        let Some(json) = message.to_json() else {
            return;
        };

        let sessions = self.sessions.read().await;
        for session in sessions.values() {
            session.send(&json);
        }
    }

    /// Called on disconnect: removes the session from every room it belongs
    /// to, emitting the same member-left notification as an explicit leave
    pub async fn drop_session(&self, session_id: &str) {
        let session = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(session_id)
        };

        let Some(session) = session else {
            debug!(session_id = %session_id, "Dropped session was not registered");
            return;
        };

        let affected_rooms: Vec<String> = {
            let mut rooms = self.rooms.write().await;
            let affected: Vec<String> = rooms
                .iter()
                .filter(|(_, members)| members.contains(session_id))
                .map(|(room_id, _)| room_id.clone())
                .collect();
            for room_id in &affected {
                if let Some(members) = rooms.get_mut(room_id) {
                    members.remove(session_id);
                    if members.is_empty() {
                        rooms.remove(room_id);
                    }
                }
            }
            affected
        };

        info!(
            session_id = %session_id,
            user = %session.identity.name,
            rooms = affected_rooms.len(),
            "Session dropped"
        );

        let message = WebSocketMessage::member_left(&session.identity);
        for room_id in &affected_rooms {
            self.send_to_members(room_id, &message, None).await;
        }
    }

    /// Number of connected sessions, in or out of rooms
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    pub async fn is_member(&self, room_id: &str, session_id: &str) -> bool {
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .map(|members| members.contains(session_id))
            .unwrap_or(false)
    }

    pub async fn member_count(&self, room_id: &str) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map(|members| members.len()).unwrap_or(0)
    }

    async fn send_to_members(
        &self,
        room_id: &str,
        message: &WebSocketMessage,
        exclude: Option<&str>,
    ) {
        let Some(json) = message.to_json() else {
            return;
        };

        let member_ids: Vec<String> = {
            let rooms = self.rooms.read().await;
            match rooms.get(room_id) {
                Some(members) => members
                    .iter()
                    .filter(|id| exclude != Some(id.as_str()))
                    .cloned()
                    .collect(),
                None => return,
            }
        };

        let sessions = self.sessions.read().await;
        for member_id in &member_ids {
            if let Some(session) = sessions.get(member_id) {
                session.send(&json);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websockets::messages::MessageType;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn identity(name: &str) -> UserIdentity {
        UserIdentity {
            id: format!("dj-{}", name),
            name: name.to_string(),
            avatar: format!("{}.png", name),
        }
    }

    async fn connect(
        registry: &RoomRegistry,
        name: &str,
    ) -> (Arc<SessionHandle>, UnboundedReceiver<String>) {
        let (session, receiver) = SessionHandle::connect(identity(name));
        registry.register(session.clone()).await;
        (session, receiver)
    }

    fn drain(receiver: &mut UnboundedReceiver<String>) -> Vec<WebSocketMessage> {
        let mut messages = Vec::new();
        while let Ok(raw) = receiver.try_recv() {
            messages.push(serde_json::from_str(&raw).unwrap());
        }
        messages
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let registry = RoomRegistry::new();
        let (alice, _rx) = connect(&registry, "alice").await;

        registry.join(&alice, "42").await;
        registry.join(&alice, "42").await;
        registry.join(&alice, "42").await;

        assert_eq!(registry.member_count("42").await, 1);
    }

    #[tokio::test]
    async fn test_repeated_join_emits_single_notification() {
        let registry = RoomRegistry::new();
        let (alice, _alice_rx) = connect(&registry, "alice").await;
        let (bob, mut bob_rx) = connect(&registry, "bob").await;

        registry.join(&bob, "42").await;
        registry.join(&alice, "42").await;
        registry.join(&alice, "42").await;

        let notifications = drain(&mut bob_rx);
        assert_eq!(notifications.len(), 1);
        assert!(matches!(
            notifications[0].message_type,
            MessageType::MemberJoined
        ));
        assert_eq!(notifications[0].payload["name"], "alice");
    }

    #[tokio::test]
    async fn test_join_does_not_notify_the_joiner() {
        let registry = RoomRegistry::new();
        let (alice, mut alice_rx) = connect(&registry, "alice").await;

        registry.join(&alice, "42").await;

        assert!(drain(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn test_leave_without_join_is_noop() {
        let registry = RoomRegistry::new();
        let (alice, _alice_rx) = connect(&registry, "alice").await;
        let (bob, mut bob_rx) = connect(&registry, "bob").await;

        registry.join(&bob, "42").await;
        registry.leave(&alice, "42").await;

        assert_eq!(registry.member_count("42").await, 1);
        // Bob must not see a member-left for someone who was never there
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_leave_notifies_remaining_members() {
        let registry = RoomRegistry::new();
        let (alice, _alice_rx) = connect(&registry, "alice").await;
        let (bob, mut bob_rx) = connect(&registry, "bob").await;

        registry.join(&bob, "42").await;
        registry.join(&alice, "42").await;
        drain(&mut bob_rx);

        registry.leave(&alice, "42").await;

        let notifications = drain(&mut bob_rx);
        assert_eq!(notifications.len(), 1);
        assert!(matches!(
            notifications[0].message_type,
            MessageType::MemberLeft
        ));
        assert_eq!(notifications[0].payload["name"], "alice");
    }

    #[tokio::test]
    async fn test_broadcast_includes_sender() {
        let registry = RoomRegistry::new();
        let (alice, mut alice_rx) = connect(&registry, "alice").await;
        let (bob, mut bob_rx) = connect(&registry, "bob").await;

        registry.join(&alice, "42").await;
        registry.join(&bob, "42").await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        let message = WebSocketMessage::member_joined(&identity("carol"));
        registry.broadcast("42", &message).await;

        assert_eq!(drain(&mut alice_rx).len(), 1);
        assert_eq!(drain(&mut bob_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_global_reaches_sessions_outside_rooms() {
        let registry = RoomRegistry::new();
        let (alice, mut alice_rx) = connect(&registry, "alice").await;
        let (_bob, mut bob_rx) = connect(&registry, "bob").await;

        registry.join(&alice, "42").await;
        drain(&mut alice_rx);

        let message = WebSocketMessage::member_joined(&identity("carol"));
        registry.broadcast_global(&message).await;

        assert_eq!(drain(&mut alice_rx).len(), 1);
        assert_eq!(drain(&mut bob_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_drop_session_removes_from_every_room() {
        let registry = RoomRegistry::new();
        let (alice, _alice_rx) = connect(&registry, "alice").await;
        let (bob, mut bob_rx) = connect(&registry, "bob").await;

        registry.join(&alice, "42").await;
        registry.join(&alice, "7").await;
        registry.join(&bob, "42").await;
        drain(&mut bob_rx);

        registry.drop_session(&alice.id).await;

        assert!(!registry.is_member("42", &alice.id).await);
        assert!(!registry.is_member("7", &alice.id).await);

        let notifications = drain(&mut bob_rx);
        assert_eq!(notifications.len(), 1);
        assert!(matches!(
            notifications[0].message_type,
            MessageType::MemberLeft
        ));
    }

    #[tokio::test]
    async fn test_drop_unknown_session_is_noop() {
        let registry = RoomRegistry::new();
        registry.drop_session("no-such-session").await;
        assert_eq!(registry.member_count("42").await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_to_disconnected_member_does_not_fail() {
        let registry = RoomRegistry::new();
        let (alice, alice_rx) = connect(&registry, "alice").await;
        let (bob, mut bob_rx) = connect(&registry, "bob").await;

        registry.join(&alice, "42").await;
        registry.join(&bob, "42").await;
        drain(&mut bob_rx);

        // Alice's connection task is gone but she has not been dropped yet
        drop(alice_rx);

        let message = WebSocketMessage::member_joined(&identity("carol"));
        registry.broadcast("42", &message).await;

        // Bob still receives the broadcast
        assert_eq!(drain(&mut bob_rx).len(), 1);
    }
}
