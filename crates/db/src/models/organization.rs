//! Organization entity model and DTOs.

use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: DbId,
    pub name: String,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub is_demo: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an organization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganization {
    pub name: String,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    /// Set by the demo generator; defaults to `false`.
    #[serde(default)]
    pub is_demo: bool,
}

/// DTO for updating an organization. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
}
