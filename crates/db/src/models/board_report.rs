//! Board report model and DTOs.

use bastion_core::status::DocumentStatus;
use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `board_reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardReport {
    pub id: DbId,
    pub organization_id: DbId,
    pub title: String,
    /// Free-form reporting period label, e.g. `Q3 2026`.
    pub period: Option<String>,
    pub content: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardReport {
    pub organization_id: DbId,
    pub title: String,
    pub period: Option<String>,
    pub content: Option<String>,
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardReport {
    pub title: Option<String>,
    pub period: Option<String>,
    pub content: Option<String>,
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardReportFilter {
    pub organization_id: Option<DbId>,
}
