//! Repository for the `war_room_sessions` table.

use bastion_core::types::DbId;
use sqlx::PgPool;

use crate::models::war_room::{CreateWarRoom, UpdateWarRoom, WarRoomFilter, WarRoomSession};

const COLUMNS: &str = "id, organization_id, scenario_id, title, objective, status, \
    scheduled_for, started_at, ended_at, created_at, updated_at";

/// Provides CRUD and lifecycle operations for war-room sessions.
pub struct WarRoomRepo;

impl WarRoomRepo {
    /// Insert a `scheduled` session.
    pub async fn create(
        pool: &PgPool,
        input: &CreateWarRoom,
    ) -> Result<WarRoomSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO war_room_sessions (organization_id, scenario_id, title, objective, scheduled_for)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarRoomSession>(&query)
            .bind(input.organization_id)
            .bind(input.scenario_id)
            .bind(input.title.trim())
            .bind(&input.objective)
            .bind(input.scheduled_for)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WarRoomSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM war_room_sessions WHERE id = $1");
        sqlx::query_as::<_, WarRoomSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List sessions, soonest scheduled first; unscheduled sessions last.
    pub async fn list(
        pool: &PgPool,
        filter: &WarRoomFilter,
    ) -> Result<Vec<WarRoomSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM war_room_sessions
             WHERE ($1::UUID IS NULL OR organization_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY scheduled_for ASC NULLS LAST, created_at DESC"
        );
        sqlx::query_as::<_, WarRoomSession>(&query)
            .bind(filter.organization_id)
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWarRoom,
    ) -> Result<Option<WarRoomSession>, sqlx::Error> {
        let query = format!(
            "UPDATE war_room_sessions SET
                scenario_id = COALESCE($2, scenario_id),
                title = COALESCE($3, title),
                objective = COALESCE($4, objective),
                scheduled_for = COALESCE($5, scheduled_for),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarRoomSession>(&query)
            .bind(id)
            .bind(input.scenario_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.objective)
            .bind(input.scheduled_for)
            .fetch_optional(pool)
            .await
    }

    /// Mark a session `active`. Starting an already active session keeps the
    /// original `started_at`. Returns `None` if the session does not exist or
    /// has ended.
    pub async fn start(pool: &PgPool, id: DbId) -> Result<Option<WarRoomSession>, sqlx::Error> {
        let query = format!(
            "UPDATE war_room_sessions SET
                status = 'active',
                started_at = COALESCE(started_at, NOW()),
                updated_at = NOW()
             WHERE id = $1 AND status <> 'ended'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarRoomSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a session `ended`. Returns `None` if it does not exist or has
    /// already ended.
    pub async fn end(pool: &PgPool, id: DbId) -> Result<Option<WarRoomSession>, sqlx::Error> {
        let query = format!(
            "UPDATE war_room_sessions SET
                status = 'ended',
                ended_at = NOW(),
                updated_at = NOW()
             WHERE id = $1 AND status <> 'ended'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarRoomSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
