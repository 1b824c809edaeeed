//! Executive briefing model and DTOs.

use bastion_core::status::DocumentStatus;
use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `executive_briefings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Briefing {
    pub id: DbId,
    pub organization_id: DbId,
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub status: String,
    /// `true` when produced by the briefing generator.
    pub generated: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a briefing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBriefing {
    pub organization_id: DbId,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    /// Defaults to `draft`.
    pub status: Option<DocumentStatus>,
    #[serde(skip)]
    pub generated: bool,
}

/// DTO for updating a briefing. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBriefing {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub status: Option<DocumentStatus>,
}

/// Query-string filter for listing briefings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefingFilter {
    pub organization_id: Option<DbId>,
    pub status: Option<DocumentStatus>,
}

/// Body of `POST /briefings/generate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBriefing {
    pub organization_id: DbId,
    pub title: Option<String>,
}
