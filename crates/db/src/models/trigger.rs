//! Executive trigger model and DTOs.

use bastion_core::signals::TriggerCondition;
use bastion_core::status::Severity;
use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `executive_triggers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub id: DbId,
    pub organization_id: DbId,
    pub signal_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub condition: String,
    pub threshold: f64,
    pub severity: String,
    pub is_active: bool,
    pub last_triggered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a trigger.
///
/// `condition` and `threshold` fall back to the linked signal's defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrigger {
    pub organization_id: DbId,
    pub signal_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub condition: Option<TriggerCondition>,
    pub threshold: Option<f64>,
    /// Defaults to `medium`.
    pub severity: Option<Severity>,
    /// Defaults to `true`.
    pub is_active: Option<bool>,
}

/// DTO for updating a trigger. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrigger {
    pub signal_id: Option<DbId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub condition: Option<TriggerCondition>,
    pub threshold: Option<f64>,
    pub severity: Option<Severity>,
    pub is_active: Option<bool>,
}

/// Query-string filter for listing triggers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerFilter {
    pub organization_id: Option<DbId>,
    pub is_active: Option<bool>,
    pub signal_id: Option<DbId>,
}

/// Body of `POST /triggers/{id}/evaluate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateTrigger {
    pub value: f64,
    /// Required for `change_pct` triggers.
    pub baseline: Option<f64>,
}
