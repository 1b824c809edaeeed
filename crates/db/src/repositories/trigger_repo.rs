//! Repository for the `executive_triggers` table.

use bastion_core::types::DbId;
use sqlx::PgPool;

use crate::models::trigger::{CreateTrigger, Trigger, TriggerFilter, UpdateTrigger};

const COLUMNS: &str = "id, organization_id, signal_id, name, description, condition, \
    threshold, severity, is_active, last_triggered_at, created_at, updated_at";

/// Provides CRUD operations for executive triggers.
pub struct TriggerRepo;

impl TriggerRepo {
    /// Insert a trigger.
    ///
    /// A missing `condition` or `threshold` is filled from the linked signal's
    /// defaults. With neither a threshold nor a signal the insert violates
    /// the `NOT NULL` constraint on `threshold`; handlers reject that earlier.
    pub async fn create(pool: &PgPool, input: &CreateTrigger) -> Result<Trigger, sqlx::Error> {
        let query = format!(
            "INSERT INTO executive_triggers
                (organization_id, signal_id, name, description, condition, threshold,
                 severity, is_active)
             VALUES (
                $1, $2, $3, $4,
                COALESCE($5, (SELECT default_condition FROM trigger_signals WHERE id = $2), 'gt'),
                COALESCE($6, (SELECT default_threshold FROM trigger_signals WHERE id = $2)),
                COALESCE($7, 'medium'),
                COALESCE($8, TRUE)
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Trigger>(&query)
            .bind(input.organization_id)
            .bind(input.signal_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.condition.map(|c| c.as_str()))
            .bind(input.threshold)
            .bind(input.severity.map(|s| s.as_str()))
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Trigger>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM executive_triggers WHERE id = $1");
        sqlx::query_as::<_, Trigger>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List triggers, most recently created first.
    pub async fn list(pool: &PgPool, filter: &TriggerFilter) -> Result<Vec<Trigger>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM executive_triggers
             WHERE ($1::UUID IS NULL OR organization_id = $1)
               AND ($2::BOOL IS NULL OR is_active = $2)
               AND ($3::UUID IS NULL OR signal_id = $3)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Trigger>(&query)
            .bind(filter.organization_id)
            .bind(filter.is_active)
            .bind(filter.signal_id)
            .fetch_all(pool)
            .await
    }

    /// Update a trigger. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTrigger,
    ) -> Result<Option<Trigger>, sqlx::Error> {
        let query = format!(
            "UPDATE executive_triggers SET
                signal_id = COALESCE($2, signal_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                condition = COALESCE($5, condition),
                threshold = COALESCE($6, threshold),
                severity = COALESCE($7, severity),
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Trigger>(&query)
            .bind(id)
            .bind(input.signal_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.condition.map(|c| c.as_str()))
            .bind(input.threshold)
            .bind(input.severity.map(|s| s.as_str()))
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Stamp `last_triggered_at` after an evaluation fires.
    pub async fn mark_triggered(pool: &PgPool, id: DbId) -> Result<Option<Trigger>, sqlx::Error> {
        let query = format!(
            "UPDATE executive_triggers SET last_triggered_at = NOW(), updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Trigger>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM executive_triggers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
