//! Repository for the `scenario_tasks` table.

use bastion_core::types::DbId;
use sqlx::PgPool;

use crate::models::task::{CreateTask, Task, TaskFilter, UpdateTask};

const COLUMNS: &str = "id, scenario_id, assignee_id, title, description, status, priority, \
    due_date, completed_at, sort_order, created_at, updated_at";

/// Provides CRUD operations for scenario tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task under `scenario_id`.
    pub async fn create(
        pool: &PgPool,
        scenario_id: DbId,
        input: &CreateTask,
    ) -> Result<Task, sqlx::Error> {
        Self::create_in(pool, scenario_id, input).await
    }

    /// Executor-generic insert, used inside transactions.
    ///
    /// A task created as `completed` gets `completed_at = NOW()`.
    pub async fn create_in<'e, E>(
        executor: E,
        scenario_id: DbId,
        input: &CreateTask,
    ) -> Result<Task, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO scenario_tasks
                (scenario_id, assignee_id, title, description, status, priority,
                 due_date, sort_order, completed_at)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'pending'), COALESCE($6, 'medium'),
                     $7, COALESCE($8, 0),
                     CASE WHEN $5 = 'completed' THEN NOW() END)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(scenario_id)
            .bind(input.assignee_id)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.priority.map(|p| p.as_str()))
            .bind(input.due_date)
            .bind(input.sort_order)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scenario_tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tasks ordered by `sort_order`, then due date.
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scenario_tasks
             WHERE ($1::UUID IS NULL OR scenario_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::UUID IS NULL OR assignee_id = $3)
             ORDER BY sort_order ASC, due_date ASC NULLS LAST, created_at ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(filter.scenario_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.assignee_id)
            .fetch_all(pool)
            .await
    }

    /// Update a task. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE scenario_tasks SET
                assignee_id = COALESCE($2, assignee_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                due_date = COALESCE($7, due_date),
                sort_order = COALESCE($8, sort_order),
                completed_at = CASE
                    WHEN $5::TEXT IS NULL THEN completed_at
                    WHEN $5 = 'completed' THEN COALESCE(completed_at, NOW())
                    ELSE NULL
                END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(input.assignee_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.priority.map(|p| p.as_str()))
            .bind(input.due_date)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scenario_tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
