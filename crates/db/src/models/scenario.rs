//! Strategic scenario model and DTOs.

use bastion_core::status::{Priority, ScenarioStatus};
use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `strategic_scenarios` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: DbId,
    pub organization_id: DbId,
    pub playbook_id: Option<DbId>,
    pub owner_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScenario {
    pub organization_id: DbId,
    pub playbook_id: Option<DbId>,
    pub owner_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `draft`.
    pub status: Option<ScenarioStatus>,
    /// Defaults to `medium`.
    pub priority: Option<Priority>,
}

/// DTO for updating a scenario. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScenario {
    pub owner_id: Option<DbId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ScenarioStatus>,
    pub priority: Option<Priority>,
}

/// Query-string filter for listing scenarios.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFilter {
    pub organization_id: Option<DbId>,
    pub status: Option<ScenarioStatus>,
}
