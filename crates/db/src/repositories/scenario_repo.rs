//! Repository for the `strategic_scenarios` table.

use bastion_core::types::DbId;
use sqlx::PgPool;

use crate::models::scenario::{CreateScenario, Scenario, ScenarioFilter, UpdateScenario};

const COLUMNS: &str = "id, organization_id, playbook_id, owner_id, title, description, \
    status, priority, created_at, updated_at";

/// Provides CRUD operations for strategic scenarios.
pub struct ScenarioRepo;

impl ScenarioRepo {
    /// Insert a new scenario. Status defaults to `draft`, priority to `medium`.
    pub async fn create(pool: &PgPool, input: &CreateScenario) -> Result<Scenario, sqlx::Error> {
        Self::create_in(pool, input).await
    }

    /// Same as [`ScenarioRepo::create`] but runs on any executor, so playbook
    /// activation can insert the scenario and its tasks in one transaction.
    pub async fn create_in<'e, E>(executor: E, input: &CreateScenario) -> Result<Scenario, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO strategic_scenarios
                (organization_id, playbook_id, owner_id, title, description, status, priority)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'draft'), COALESCE($7, 'medium'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scenario>(&query)
            .bind(input.organization_id)
            .bind(input.playbook_id)
            .bind(input.owner_id)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.priority.map(|p| p.as_str()))
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Scenario>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM strategic_scenarios WHERE id = $1");
        sqlx::query_as::<_, Scenario>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List scenarios, most recently created first.
    pub async fn list(
        pool: &PgPool,
        filter: &ScenarioFilter,
    ) -> Result<Vec<Scenario>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM strategic_scenarios
             WHERE ($1::UUID IS NULL OR organization_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Scenario>(&query)
            .bind(filter.organization_id)
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Update a scenario. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateScenario,
    ) -> Result<Option<Scenario>, sqlx::Error> {
        let query = format!(
            "UPDATE strategic_scenarios SET
                owner_id = COALESCE($2, owner_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scenario>(&query)
            .bind(id)
            .bind(input.owner_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.priority.map(|p| p.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a scenario and its tasks. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM strategic_scenarios WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
