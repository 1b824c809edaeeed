//! War-room session model and DTOs.

use bastion_core::status::SessionStatus;
use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `war_room_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarRoomSession {
    pub id: DbId,
    pub organization_id: DbId,
    pub scenario_id: Option<DbId>,
    pub title: String,
    pub objective: Option<String>,
    pub status: String,
    pub scheduled_for: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for scheduling a war-room session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarRoom {
    pub organization_id: DbId,
    pub scenario_id: Option<DbId>,
    pub title: String,
    pub objective: Option<String>,
    pub scheduled_for: Option<Timestamp>,
}

/// DTO for updating a session. Status changes go through start/end.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWarRoom {
    pub scenario_id: Option<DbId>,
    pub title: Option<String>,
    pub objective: Option<String>,
    pub scheduled_for: Option<Timestamp>,
}

/// Query-string filter for listing sessions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarRoomFilter {
    pub organization_id: Option<DbId>,
    pub status: Option<SessionStatus>,
}
