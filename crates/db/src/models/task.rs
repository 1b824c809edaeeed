//! Scenario task model and DTOs.

use bastion_core::status::{Priority, TaskStatus};
use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `scenario_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: DbId,
    pub scenario_id: DbId,
    pub assignee_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task. The parent scenario comes from the path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub assignee_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `pending`.
    pub status: Option<TaskStatus>,
    /// Defaults to `medium`.
    pub priority: Option<Priority>,
    pub due_date: Option<Timestamp>,
    pub sort_order: Option<i32>,
}

/// DTO for updating a task. All fields are optional.
///
/// Moving a task to `completed` stamps `completed_at`; moving it to any
/// other status clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub assignee_id: Option<DbId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<Timestamp>,
    pub sort_order: Option<i32>,
}

/// Query-string filter for listing tasks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub scenario_id: Option<DbId>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<DbId>,
}
