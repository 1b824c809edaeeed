//! Organization dashboard aggregate.

use serde::Serialize;

use crate::models::organization::Organization;
use crate::models::playbook::CountByKey;

/// Rolled-up counts for `GET /organizations/{id}/dashboard`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDashboard {
    pub organization: Organization,
    pub scenarios_by_status: Vec<CountByKey>,
    pub open_alerts_by_severity: Vec<CountByKey>,
    pub active_triggers: i64,
    pub active_war_rooms: i64,
    pub tasks_total: i64,
    pub tasks_completed: i64,
    /// `tasks_completed / tasks_total`, or 0 with no tasks.
    pub task_completion_ratio: f64,
}
