//! Repository for the `alerts` table.

use bastion_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert::{Alert, AlertFilter, CreateAlert, UpdateAlert};

const COLUMNS: &str = "id, organization_id, trigger_id, title, message, severity, status, \
    observed_value, recommended_playbook_ids, acknowledged_at, resolved_at, \
    created_at, updated_at";

/// Provides CRUD and lifecycle operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert an alert. Status defaults to `open`.
    pub async fn create(pool: &PgPool, input: &CreateAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts
                (organization_id, trigger_id, title, message, severity, status,
                 observed_value, recommended_playbook_ids, acknowledged_at, resolved_at)
             VALUES ($1, $2, $3, COALESCE($4, ''), COALESCE($5, 'medium'), COALESCE($6, 'open'),
                     $7, $8,
                     CASE WHEN $6 IN ('acknowledged', 'resolved') THEN NOW() END,
                     CASE WHEN $6 = 'resolved' THEN NOW() END)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(input.organization_id)
            .bind(input.trigger_id)
            .bind(input.title.trim())
            .bind(&input.message)
            .bind(input.severity.map(|s| s.as_str()))
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.observed_value)
            .bind(&input.recommended_playbook_ids)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List alerts, newest first.
    pub async fn list(pool: &PgPool, filter: &AlertFilter) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts
             WHERE ($1::UUID IS NULL OR organization_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::TEXT IS NULL OR severity = $3)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(filter.organization_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.severity.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Update alert text fields. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAlert,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET
                title = COALESCE($2, title),
                message = COALESCE($3, message),
                severity = COALESCE($4, severity),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.message)
            .bind(input.severity.map(|s| s.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Move an `open` alert to `acknowledged`.
    ///
    /// Returns `None` when the alert does not exist or is not open; the
    /// handler inspects the current row to tell those apart.
    pub async fn acknowledge(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET
                status = 'acknowledged',
                acknowledged_at = NOW(),
                updated_at = NOW()
             WHERE id = $1 AND status = 'open'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move an unresolved alert to `resolved`.
    ///
    /// Returns `None` when the alert does not exist or is already resolved.
    pub async fn resolve(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET
                status = 'resolved',
                acknowledged_at = COALESCE(acknowledged_at, NOW()),
                resolved_at = NOW(),
                updated_at = NOW()
             WHERE id = $1 AND status <> 'resolved'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
