//! Demo data generation and reset.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use bastion_core::activity::{actions, entities};
use bastion_core::demo::{self, DemoPlan};
use bastion_core::types::DbId;
use bastion_db::models::alert::CreateAlert;
use bastion_db::models::organization::{CreateOrganization, Organization};
use bastion_db::models::scenario::CreateScenario;
use bastion_db::models::task::CreateTask;
use bastion_db::models::trigger::CreateTrigger;
use bastion_db::models::user::CreateUser;
use bastion_db::repositories::{
    AlertRepo, DemoRepo, OrganizationRepo, ResetCounts, ScenarioRepo, SignalRepo, TaskRepo,
    TriggerRepo, UserRepo,
};
use bastion_events::ChangeEvent;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::collaboration::REASON_RESET;

/// Request body for `POST /demo/generate`. Both fields are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDemo {
    pub organization_name: Option<String>,
    pub industry: Option<String>,
}

/// Ids of everything a demo generation created.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSummary {
    pub organization_id: DbId,
    pub organization_name: String,
    pub industry: String,
    pub user_ids: Vec<DbId>,
    pub scenario_ids: Vec<DbId>,
    pub task_count: usize,
    pub trigger_ids: Vec<DbId>,
    pub alert_ids: Vec<DbId>,
}

/// Response body for `DELETE /demo/reset`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSummary {
    #[serde(flatten)]
    pub deleted: ResetCounts,
    pub rooms_closed: usize,
}

/// POST /api/demo/generate
///
/// Creates a demo organization with users, scenarios and tasks, triggers
/// on seeded signals, and alerts. If any insert fails the organization is
/// deleted again, taking the partial data with it.
pub async fn generate(
    State(state): State<AppState>,
    body: Option<Json<GenerateDemo>>,
) -> AppResult<(StatusCode, Json<DemoSummary>)> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let plan = demo::generate(
        rand::random(),
        input.organization_name.as_deref(),
        input.industry.as_deref(),
    );

    let organization = OrganizationRepo::create(
        &state.pool,
        &CreateOrganization {
            name: plan.organization_name.clone(),
            industry: Some(plan.industry.clone()),
            size: Some("enterprise".to_string()),
            description: Some(format!("Generated demo tenant ({})", plan.industry)),
            is_demo: true,
        },
    )
    .await?;

    let summary = match populate(&state, &organization, &plan).await {
        Ok(summary) => summary,
        Err(e) => {
            if let Err(cleanup) = OrganizationRepo::delete(&state.pool, organization.id).await {
                tracing::error!(
                    error = %cleanup,
                    organization_id = %organization.id,
                    "Failed to remove partial demo organization",
                );
            }
            return Err(e);
        }
    };

    tracing::info!(
        organization_id = %summary.organization_id,
        users = summary.user_ids.len(),
        scenarios = summary.scenario_ids.len(),
        tasks = summary.task_count,
        triggers = summary.trigger_ids.len(),
        alerts = summary.alert_ids.len(),
        "Demo data generated",
    );
    state.event_bus.publish(
        ChangeEvent::new(entities::DEMO, actions::GENERATED)
            .with_entity(organization.id)
            .with_organization(organization.id)
            .with_details(serde_json::json!({
                "organizationName": summary.organization_name,
                "industry": summary.industry,
            })),
    );
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn populate(
    state: &AppState,
    organization: &Organization,
    plan: &DemoPlan,
) -> AppResult<DemoSummary> {
    let tag = organization.id.simple().to_string();
    let tag = &tag[..8];
    let mut summary = DemoSummary {
        organization_id: organization.id,
        organization_name: organization.name.clone(),
        industry: plan.industry.clone(),
        ..Default::default()
    };

    for user in &plan.users {
        let created = UserRepo::create(
            &state.pool,
            &CreateUser {
                organization_id: organization.id,
                name: user.name.clone(),
                email: tag_email(&user.email, tag),
                title: Some(user.title.clone()),
                role: Some(user.role),
            },
        )
        .await?;
        summary.user_ids.push(created.id);
    }

    let now = Utc::now();
    for scenario in &plan.scenarios {
        let created = ScenarioRepo::create(
            &state.pool,
            &CreateScenario {
                organization_id: organization.id,
                playbook_id: None,
                owner_id: summary.user_ids.first().copied(),
                title: scenario.title.clone(),
                description: Some(scenario.description.clone()),
                status: Some(scenario.status),
                priority: Some(scenario.priority),
            },
        )
        .await?;
        for (index, task) in scenario.tasks.iter().enumerate() {
            TaskRepo::create(
                &state.pool,
                created.id,
                &CreateTask {
                    assignee_id: summary.user_ids.get(task.assignee).copied(),
                    title: task.title.clone(),
                    description: None,
                    status: Some(task.status),
                    priority: Some(task.priority),
                    due_date: Some(now + Duration::days(task.due_in_days)),
                    sort_order: Some(index as i32),
                },
            )
            .await?;
            summary.task_count += 1;
        }
        summary.scenario_ids.push(created.id);
    }

    let mut signal_ids = Vec::with_capacity(plan.triggers.len());
    for trigger in &plan.triggers {
        let signal_id = SignalRepo::find_id_by_name(&state.pool, trigger.signal.name)
            .await?
            .ok_or_else(|| {
                AppError::ServiceUnavailable(format!(
                    "Signal catalogue is not seeded (missing '{}')",
                    trigger.signal.name
                ))
            })?;
        let created = TriggerRepo::create(
            &state.pool,
            &CreateTrigger {
                organization_id: organization.id,
                signal_id: Some(signal_id),
                name: trigger.name.clone(),
                description: Some(format!(
                    "Watches {} ({})",
                    trigger.signal.name, trigger.signal.unit
                )),
                condition: Some(trigger.signal.default_condition),
                threshold: Some(trigger.signal.default_threshold),
                severity: Some(trigger.severity),
                is_active: Some(true),
            },
        )
        .await?;
        summary.trigger_ids.push(created.id);
        signal_ids.push(signal_id);
    }

    for alert in &plan.alerts {
        let trigger = &plan.triggers[alert.trigger];
        let recommended_playbook_ids =
            SignalRepo::playbook_ids_for(&state.pool, signal_ids[alert.trigger]).await?;
        let created = AlertRepo::create(
            &state.pool,
            &CreateAlert {
                organization_id: organization.id,
                trigger_id: Some(summary.trigger_ids[alert.trigger]),
                title: alert.title.clone(),
                message: Some(alert.message.clone()),
                severity: Some(alert.severity),
                status: Some(alert.status),
                observed_value: Some(trigger.signal.default_threshold),
                recommended_playbook_ids,
            },
        )
        .await?;
        summary.alert_ids.push(created.id);
    }

    Ok(summary)
}

/// Insert `+tag` before the `@` so repeated demo tenants never collide on
/// the unique email constraint.
fn tag_email(email: &str, tag: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => format!("{local}+{tag}@{domain}"),
        None => format!("{email}+{tag}"),
    }
}

/// DELETE /api/demo/reset
///
/// Removes every organization (and everything owned by one) plus the
/// activity log, and closes all open decision rooms. The seeded library
/// and signal catalogue stay.
pub async fn reset(State(state): State<AppState>) -> AppResult<Json<ResetSummary>> {
    let deleted = DemoRepo::reset(&state.pool).await?;
    let rooms_closed = state.collab.close_all(REASON_RESET).await;

    tracing::info!(
        organizations = deleted.organizations,
        activity_logs = deleted.activity_logs,
        rooms_closed,
        "Demo data reset",
    );
    state.event_bus.publish(
        ChangeEvent::new(entities::DEMO, actions::RESET).with_details(serde_json::json!({
            "organizations": deleted.organizations,
            "roomsClosed": rooms_closed,
        })),
    );
    Ok(Json(ResetSummary {
        deleted,
        rooms_closed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_tag_goes_before_the_domain() {
        assert_eq!(
            tag_email("ada.lovelace@acme.example", "1a2b3c4d"),
            "ada.lovelace+1a2b3c4d@acme.example"
        );
        assert_eq!(tag_email("nobody", "x"), "nobody+x");
    }
}
