//! REST view onto the in-memory decision rooms.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bastion_core::collaboration::{RoomError, RoomSnapshot, RoomSummary};
use bastion_core::error::CoreError;
use bastion_core::types::DbId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::collaboration::REASON_CLOSED;

/// Request body for `POST /collaboration/rooms`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub name: String,
    pub scenario_id: Option<DbId>,
}

/// GET /api/collaboration/rooms
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    Json(state.collab.list_rooms().await)
}

/// POST /api/collaboration/rooms
pub async fn create_room(
    State(state): State<AppState>,
    Json(input): Json<CreateRoom>,
) -> AppResult<(StatusCode, Json<RoomSnapshot>)> {
    let room = state
        .collab
        .open_room(None, &input.name, input.scenario_id)
        .await
        .map_err(|e| match e {
            RoomError::InvalidRoom(msg) => AppError::BadRequest(msg),
            other => AppError::InternalError(other.to_string()),
        })?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// GET /api/collaboration/rooms/{id}
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RoomSnapshot>> {
    let room = state
        .collab
        .room_snapshot(&id)
        .await
        .ok_or_else(|| CoreError::not_found("Room", &id))?;
    Ok(Json(room))
}

/// DELETE /api/collaboration/rooms/{id}
///
/// Members receive `room_closed` before the room is dropped.
pub async fn close_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if !state.collab.close_room(&id, REASON_CLOSED).await {
        return Err(CoreError::not_found("Room", &id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
