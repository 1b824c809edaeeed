//! Aggregate queries behind the organization dashboard.

use bastion_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::OrganizationDashboard;
use crate::models::organization::Organization;
use crate::models::playbook::CountByKey;

pub struct DashboardRepo;

impl DashboardRepo {
    /// Roll up scenario, alert, trigger, session and task counts for one
    /// organization.
    pub async fn for_organization(
        pool: &PgPool,
        organization: Organization,
    ) -> Result<OrganizationDashboard, sqlx::Error> {
        let org_id = organization.id;

        let scenarios_by_status = sqlx::query_as::<_, CountByKey>(
            "SELECT status AS key, COUNT(*)::BIGINT AS count
             FROM strategic_scenarios
             WHERE organization_id = $1
             GROUP BY status
             ORDER BY status",
        )
        .bind(org_id)
        .fetch_all(pool)
        .await?;

        let open_alerts_by_severity = sqlx::query_as::<_, CountByKey>(
            "SELECT severity AS key, COUNT(*)::BIGINT AS count
             FROM alerts
             WHERE organization_id = $1 AND status = 'open'
             GROUP BY severity
             ORDER BY severity",
        )
        .bind(org_id)
        .fetch_all(pool)
        .await?;

        let active_triggers = count(
            pool,
            "SELECT COUNT(*)::BIGINT FROM executive_triggers WHERE organization_id = $1 AND is_active",
            org_id,
        )
        .await?;

        let active_war_rooms = count(
            pool,
            "SELECT COUNT(*)::BIGINT FROM war_room_sessions WHERE organization_id = $1 AND status = 'active'",
            org_id,
        )
        .await?;

        let (tasks_total, tasks_completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(t.id)::BIGINT,
                    COUNT(t.id) FILTER (WHERE t.status = 'completed')::BIGINT
             FROM scenario_tasks t
             JOIN strategic_scenarios s ON s.id = t.scenario_id
             WHERE s.organization_id = $1",
        )
        .bind(org_id)
        .fetch_one(pool)
        .await?;

        let task_completion_ratio = if tasks_total == 0 {
            0.0
        } else {
            tasks_completed as f64 / tasks_total as f64
        };

        Ok(OrganizationDashboard {
            organization,
            scenarios_by_status,
            open_alerts_by_severity,
            active_triggers,
            active_war_rooms,
            tasks_total,
            tasks_completed,
            task_completion_ratio,
        })
    }
}

async fn count(pool: &PgPool, query: &str, org_id: DbId) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(query)
        .bind(org_id)
        .fetch_one(pool)
        .await
}
