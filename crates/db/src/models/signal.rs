//! Trigger signal catalogue models.

use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `trigger_signals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSignal {
    pub id: DbId,
    pub category: String,
    pub name: String,
    pub unit: String,
    pub default_threshold: f64,
    pub default_condition: String,
    pub created_at: Timestamp,
}

/// A playbook recommended for a signal, ordered by relevance.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalPlaybook {
    pub playbook_id: DbId,
    pub name: String,
    pub domain: String,
    pub category: String,
    pub severity: String,
    pub relevance: f64,
}

/// Query-string filter for listing signals.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalFilter {
    /// Signal category slug.
    pub category: Option<String>,
}
