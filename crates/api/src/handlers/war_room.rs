//! Handlers for war-room sessions.
//!
//! Starting a session opens an in-memory decision room with the session id
//! as its room id; ending it closes that room.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bastion_core::activity::{actions, entities};
use bastion_core::error::CoreError;
use bastion_core::status::{validate_name, validate_optional_name};
use bastion_core::types::DbId;
use bastion_db::models::war_room::{CreateWarRoom, UpdateWarRoom, WarRoomFilter, WarRoomSession};
use bastion_db::repositories::WarRoomRepo;
use bastion_events::ChangeEvent;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::collaboration::REASON_SESSION_ENDED;

async fn find(state: &AppState, id: DbId) -> AppResult<WarRoomSession> {
    let session = WarRoomRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("War room session", id))?;
    Ok(session)
}

fn publish(state: &AppState, session: &WarRoomSession, action: &str) {
    state.event_bus.publish(
        ChangeEvent::new(entities::WAR_ROOM, action)
            .with_entity(session.id)
            .with_organization(session.organization_id)
            .with_details(serde_json::json!({
                "title": session.title,
                "status": session.status,
            })),
    );
}

/// POST /api/war-rooms
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateWarRoom>,
) -> AppResult<(StatusCode, Json<WarRoomSession>)> {
    validate_name("title", &input.title)?;

    let session = WarRoomRepo::create(&state.pool, &input).await?;
    publish(&state, &session, actions::CREATED);
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/war-rooms?organizationId&status
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<WarRoomFilter>,
) -> AppResult<Json<Vec<WarRoomSession>>> {
    let sessions = WarRoomRepo::list(&state.pool, &filter).await?;
    Ok(Json(sessions))
}

/// GET /api/war-rooms/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<WarRoomSession>> {
    Ok(Json(find(&state, id).await?))
}

/// PATCH /api/war-rooms/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWarRoom>,
) -> AppResult<Json<WarRoomSession>> {
    validate_optional_name("title", input.title.as_deref())?;

    let session = WarRoomRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("War room session", id))?;
    publish(&state, &session, actions::UPDATED);
    Ok(Json(session))
}

/// POST /api/war-rooms/{id}/start
///
/// Idempotent while the session is live. An ended session cannot be
/// restarted (409).
pub async fn start(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<WarRoomSession>> {
    let Some(session) = WarRoomRepo::start(&state.pool, id).await? else {
        find(&state, id).await?;
        return Err(CoreError::Conflict(format!("War room session {id} has ended")).into());
    };

    state
        .collab
        .open_room(Some(id.to_string()), &session.title, session.scenario_id)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to open decision room: {e}")))?;

    tracing::info!(session_id = %id, "War room started");
    publish(&state, &session, actions::STARTED);
    Ok(Json(session))
}

/// POST /api/war-rooms/{id}/end
pub async fn end(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<WarRoomSession>> {
    let Some(session) = WarRoomRepo::end(&state.pool, id).await? else {
        find(&state, id).await?;
        return Err(CoreError::Conflict(format!("War room session {id} has already ended")).into());
    };

    let closed = state
        .collab
        .close_room(&id.to_string(), REASON_SESSION_ENDED)
        .await;

    tracing::info!(session_id = %id, room_closed = closed, "War room ended");
    publish(&state, &session, actions::ENDED);
    Ok(Json(session))
}
