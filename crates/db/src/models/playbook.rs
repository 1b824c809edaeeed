//! Playbook library models, lookup tables and DTOs.

use bastion_core::library::{Frequency, StrategicCategory, TaskTemplate};
use bastion_core::status::Severity;
use bastion_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A `playbook_library` row joined with its domain and category slugs.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playbook {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub domain_id: DbId,
    pub domain: String,
    pub category_id: DbId,
    pub category: String,
    pub severity: String,
    pub frequency: String,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub estimated_duration_days: Option<i32>,
    /// JSON array of stakeholder role names.
    pub stakeholders: serde_json::Value,
    /// JSON array of [`TaskTemplate`] objects.
    pub tasks: serde_json::Value,
    pub is_template: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Playbook {
    /// Decode the stored task plan. Malformed entries yield an empty plan.
    pub fn task_templates(&self) -> Vec<TaskTemplate> {
        serde_json::from_value(self.tasks.clone()).unwrap_or_default()
    }
}

/// DTO for creating a custom playbook.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaybook {
    pub name: String,
    pub description: Option<String>,
    /// Domain slug, e.g. `cybersecurity`.
    pub domain: String,
    pub category: StrategicCategory,
    /// Defaults to `medium`.
    pub severity: Option<Severity>,
    /// Defaults to `occasional`.
    pub frequency: Option<Frequency>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub estimated_duration_days: Option<i32>,
    pub stakeholders: Option<Vec<String>>,
    pub tasks: Option<Vec<TaskTemplate>>,
}

/// DTO for updating a playbook. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaybook {
    pub name: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub category: Option<StrategicCategory>,
    pub severity: Option<Severity>,
    pub frequency: Option<Frequency>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub estimated_duration_days: Option<i32>,
    pub stakeholders: Option<Vec<String>>,
    pub tasks: Option<Vec<TaskTemplate>>,
}

/// Query-string filter for browsing the library.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookFilter {
    /// Domain slug.
    pub domain: Option<String>,
    pub category: Option<StrategicCategory>,
    pub severity: Option<Severity>,
    /// Case-insensitive substring match on name and description.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A row from `playbook_domains` or `playbook_categories` with its usage count.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookGroup {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub playbook_count: i64,
}

/// One bucket of a grouped count.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountByKey {
    pub key: String,
    pub count: i64,
}

/// Aggregate library statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookStats {
    pub total: i64,
    pub templates: i64,
    pub by_category: Vec<CountByKey>,
    pub by_domain: Vec<CountByKey>,
    pub by_severity: Vec<CountByKey>,
}

/// Body of `POST /playbooks/{id}/activate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivatePlaybook {
    pub organization_id: DbId,
    /// Defaults to the playbook name.
    pub title: Option<String>,
    pub owner_id: Option<DbId>,
}
