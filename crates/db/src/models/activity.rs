//! Activity log model and query parameters.

use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `activity_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: DbId,
    pub organization_id: Option<DbId>,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub action: String,
    pub actor: Option<String>,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

/// Insert DTO. `details` must already be redacted.
#[derive(Debug, Clone)]
pub struct CreateActivityLog {
    pub organization_id: Option<DbId>,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub action: String,
    pub actor: Option<String>,
    pub details: serde_json::Value,
}

/// Query-string filter for `GET /activity`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFilter {
    pub organization_id: Option<DbId>,
    pub entity_type: Option<String>,
    pub action: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paged activity response.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityPage {
    pub items: Vec<ActivityLog>,
    pub total: i64,
}
