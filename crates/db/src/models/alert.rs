//! Alert model and DTOs.

use bastion_core::status::{AlertStatus, Severity};
use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: DbId,
    pub organization_id: DbId,
    pub trigger_id: Option<DbId>,
    pub title: String,
    pub message: String,
    pub severity: String,
    pub status: String,
    pub observed_value: Option<f64>,
    pub recommended_playbook_ids: Vec<DbId>,
    pub acknowledged_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an alert.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlert {
    pub organization_id: DbId,
    pub trigger_id: Option<DbId>,
    pub title: String,
    pub message: Option<String>,
    /// Defaults to `medium`.
    pub severity: Option<Severity>,
    /// Defaults to `open`.
    pub status: Option<AlertStatus>,
    pub observed_value: Option<f64>,
    #[serde(default)]
    pub recommended_playbook_ids: Vec<DbId>,
}

/// DTO for updating an alert. All fields are optional.
///
/// Status transitions go through the acknowledge/resolve endpoints so the
/// timestamps stay consistent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlert {
    pub title: Option<String>,
    pub message: Option<String>,
    pub severity: Option<Severity>,
}

/// Query-string filter for listing alerts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertFilter {
    pub organization_id: Option<DbId>,
    pub status: Option<AlertStatus>,
    pub severity: Option<Severity>,
}
