use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::auth::UserIdentity;
use crate::event::{ActorSnapshot, EventPayload, EventStore};
use crate::program::{ProgramModel, ProgramStatus, ProgramStore};
use crate::registry::{RoomRegistry, SessionHandle};
use crate::shared::AppError;
use crate::websockets::messages::WebSocketMessage;

/// Authenticated entry point for all room-scoped real-time actions
///
/// Every submit operation validates first, persists through the external
/// store second, and broadcasts the canonical persisted event last, so a
/// client never sees an event that failed to save. Errors stay local to the
/// originating session; other room members are never told an operation
/// failed.
pub struct LiveEventRouter {
    registry: Arc<RoomRegistry>,
    event_store: Arc<dyn EventStore>,
    program_store: Arc<dyn ProgramStore>,
}

impl LiveEventRouter {
    pub fn new(
        registry: Arc<RoomRegistry>,
        event_store: Arc<dyn EventStore>,
        program_store: Arc<dyn ProgramStore>,
    ) -> Self {
        Self {
            registry,
            event_store,
            program_store,
        }
    }

    pub async fn enter_room(&self, session: &Arc<SessionHandle>, room_id: &str) {
        self.registry.join(session, room_id).await;
    }

    pub async fn leave_room(&self, session: &Arc<SessionHandle>, room_id: &str) {
        self.registry.leave(session, room_id).await;
    }

    #[instrument(skip(self, session, message), fields(session_id = %session.id))]
    pub async fn submit_chat(
        &self,
        session: &Arc<SessionHandle>,
        room_id: &str,
        message: &str,
    ) -> Result<(), AppError> {
        if message.trim().is_empty() {
            return Err(AppError::Validation(
                "chat message must not be empty".to_string(),
            ));
        }

        self.submit(
            session,
            room_id,
            EventPayload::Chat {
                message: message.to_string(),
            },
        )
        .await
    }

    #[instrument(skip(self, session, reaction), fields(session_id = %session.id))]
    pub async fn submit_reaction(
        &self,
        session: &Arc<SessionHandle>,
        room_id: &str,
        reaction: &str,
    ) -> Result<(), AppError> {
        if reaction.trim().is_empty() {
            return Err(AppError::Validation(
                "reaction must not be empty".to_string(),
            ));
        }

        self.submit(
            session,
            room_id,
            EventPayload::Reaction {
                reaction: reaction.to_string(),
            },
        )
        .await
    }

    #[instrument(skip(self, session, gift_type), fields(session_id = %session.id))]
    pub async fn submit_gift(
        &self,
        session: &Arc<SessionHandle>,
        room_id: &str,
        gift_type: &str,
        value: f64,
    ) -> Result<(), AppError> {
        if gift_type.trim().is_empty() {
            return Err(AppError::Validation(
                "gift type must not be empty".to_string(),
            ));
        }
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::Validation(
                "gift value must be a non-negative number".to_string(),
            ));
        }

        self.submit(
            session,
            room_id,
            EventPayload::Gift {
                gift_type: gift_type.to_string(),
                value,
            },
        )
        .await
    }

    /// Shared submit contract: membership check, persist, then broadcast
    /// the canonical event (store-assigned id and timestamp) to the room
    async fn submit(
        &self,
        session: &Arc<SessionHandle>,
        room_id: &str,
        payload: EventPayload,
    ) -> Result<(), AppError> {
        if !self.registry.is_member(room_id, &session.id).await {
            return Err(AppError::Validation(format!(
                "session is not a member of room {}",
                room_id
            )));
        }

        let actor = ActorSnapshot::from(&session.identity);
        let event = self
            .event_store
            .create_event(room_id, actor, payload)
            .await?;

        info!(
            event_id = %event.id,
            room_id = %room_id,
            kind = ?event.kind,
            "Event persisted, broadcasting to room"
        );

        let message = WebSocketMessage::room_event(&event);
        self.registry.broadcast(room_id, &message).await;
        Ok(())
    }

    /// Updates a program's status on behalf of its owning DJ
    ///
    /// Going live finishes every other live program of the same owner first
    /// (the store calls are sequential, not atomic; a failure between the
    /// sibling updates and the target update leaves the siblings finished).
    /// Status changes are broadcast globally so every viewer sees consistent
    /// state, one message per cascaded sibling plus one for the target, all
    /// built from store-confirmed records.
    #[instrument(skip(self, identity), fields(user_id = %identity.id))]
    pub async fn set_program_status(
        &self,
        identity: &UserIdentity,
        program_id: &str,
        status: ProgramStatus,
    ) -> Result<ProgramModel, AppError> {
        let program = self
            .program_store
            .get_program(program_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Program not found".to_string()))?;

        if !program.owned_by(&identity.id) {
            warn!(
                program_id = %program_id,
                owner = %program.owner.id,
                "Status change attempted by non-owner"
            );
            return Err(AppError::Validation(
                "only the owning DJ can change program status".to_string(),
            ));
        }

        let mut finished_siblings = Vec::new();
        if status == ProgramStatus::Live && !program.is_live() {
            let live_siblings = self
                .program_store
                .list_live_programs_by_owner(&identity.id)
                .await?;
            for sibling in live_siblings.iter().filter(|p| p.id != program_id) {
                let finished = self
                    .program_store
                    .set_status(&sibling.id, ProgramStatus::Finished)
                    .await?;
                info!(
                    program_id = %finished.id,
                    "Sibling program auto-finished by live transition"
                );
                finished_siblings.push(finished);
            }
        }

        let updated = self.program_store.set_status(program_id, status).await?;

        for sibling in &finished_siblings {
            self.registry
                .broadcast_global(&WebSocketMessage::program_status(sibling))
                .await;
        }
        self.registry
            .broadcast_global(&WebSocketMessage::program_status(&updated))
            .await;

        info!(
            program_id = %program_id,
            status = %status,
            cascaded = finished_siblings.len(),
            "Program status changed"
        );
        Ok(updated)
    }

    /// Triggered by transport closure; never fails
    pub async fn disconnect(&self, session_id: &str) {
        self.registry.drop_session(session_id).await;
    }
}
