use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::models::{ProgramModel, ProgramStatus};
use super::store::ProgramStore;
use crate::auth::{Authenticator, UserIdentity};
use crate::event::{EventPage, EventStore};
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct ProgramFilter {
    pub status: Option<ProgramStatus>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusBody {
    pub status: ProgramStatus,
}

/// GET /programs, the listing for the schedule page, optional status filter
#[instrument(name = "list_programs", skip(state))]
pub async fn list_programs(
    State(state): State<AppState>,
    Query(filter): Query<ProgramFilter>,
) -> Result<Json<Vec<ProgramModel>>, AppError> {
    let programs = state.program_store.list_programs(filter.status).await?;
    Ok(Json(programs))
}

/// GET /programs/{id}
#[instrument(name = "get_program", skip(state))]
pub async fn get_program(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
) -> Result<Json<ProgramModel>, AppError> {
    let program = state
        .program_store
        .get_program(&program_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Program not found".to_string()))?;
    Ok(Json(program))
}

/// PATCH /programs/{id}/status, the owning DJ starting/stopping a broadcast
///
/// Delegates to the live event router, which performs the cascade and the
/// global status broadcasts.
#[instrument(name = "set_program_status", skip(state, headers, body))]
pub async fn set_program_status(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<SetStatusBody>,
) -> Result<Json<ProgramModel>, AppError> {
    let identity = authenticate(&state, &headers).await?;

    info!(
        program_id = %program_id,
        status = %body.status,
        user_id = %identity.id,
        "Program status change requested"
    );

    let updated = state
        .router
        .set_program_status(&identity, &program_id, body.status)
        .await?;
    Ok(Json(updated))
}

/// GET /programs/{id}/events, paginated event history, newest first
#[instrument(name = "list_program_events", skip(state))]
pub async fn list_program_events(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
    Query(page_query): Query<PageQuery>,
) -> Result<Json<EventPage>, AppError> {
    let page = page_query.page.unwrap_or(1);
    let limit = page_query.limit.unwrap_or(20);

    let events = state
        .event_store
        .list_events(&program_id, page, limit)
        .await?;
    Ok(Json(events))
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserIdentity, AppError> {
    let credential = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| {
            warn!("Missing or invalid Authorization header");
            AppError::Unauthorized("Missing authentication credential".to_string())
        })?;

    state.authenticator.verify(credential).await
}
