//! Handlers for the playbook library: search, custom playbook CRUD,
//! lookup tables and activation into a scenario.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::Json;
use bastion_core::activity::{actions, entities};
use bastion_core::error::CoreError;
use bastion_core::library::{validate_plan_bounds, validate_task_plan, TaskTemplate};
use bastion_core::status::{validate_name, validate_optional_name, Priority, ScenarioStatus};
use bastion_core::types::DbId;
use bastion_db::models::playbook::{
    ActivatePlaybook, CreatePlaybook, Playbook, PlaybookFilter, PlaybookGroup, PlaybookStats,
    UpdatePlaybook,
};
use bastion_db::models::scenario::{CreateScenario, Scenario};
use bastion_db::models::task::{CreateTask, Task};
use bastion_db::repositories::{
    OrganizationRepo, PlaybookCategoryRepo, PlaybookDomainRepo, PlaybookRepo, ScenarioRepo,
    TaskRepo,
};
use bastion_events::ChangeEvent;
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying the unpaginated match count on list responses.
pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Response body for `POST /playbooks/{id}/activate`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    pub scenario: Scenario,
    pub tasks: Vec<Task>,
}

async fn domain_id(state: &AppState, slug: &str) -> AppResult<DbId> {
    PlaybookDomainRepo::find_id_by_slug(&state.pool, slug)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Unknown playbook domain '{slug}'")))
}

async fn category_id(state: &AppState, slug: &str) -> AppResult<DbId> {
    PlaybookCategoryRepo::find_id_by_slug(&state.pool, slug)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Unknown playbook category '{slug}'")))
}

fn validate_custom_plan(
    budget_min: Option<i64>,
    budget_max: Option<i64>,
    estimated_duration_days: Option<i32>,
    tasks: Option<&[TaskTemplate]>,
) -> Result<(), CoreError> {
    validate_plan_bounds(budget_min, budget_max, estimated_duration_days)?;
    if let Some(tasks) = tasks {
        validate_task_plan(tasks)?;
    }
    Ok(())
}

/// GET /api/playbooks?domain&category&severity&search&limit&offset
///
/// The total match count (ignoring `limit`/`offset`) is returned in the
/// `x-total-count` header.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<PlaybookFilter>,
) -> AppResult<(HeaderMap, Json<Vec<Playbook>>)> {
    let playbooks = PlaybookRepo::list(&state.pool, &filter).await?;
    let total = PlaybookRepo::count(&state.pool, &filter).await?;

    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(total));
    Ok((headers, Json(playbooks)))
}

/// GET /api/playbooks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Playbook>> {
    let playbook = PlaybookRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Playbook", id))?;
    Ok(Json(playbook))
}

/// POST /api/playbooks
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePlaybook>,
) -> AppResult<(StatusCode, Json<Playbook>)> {
    validate_name("name", &input.name)?;
    validate_custom_plan(
        input.budget_min,
        input.budget_max,
        input.estimated_duration_days,
        input.tasks.as_deref(),
    )?;
    let domain = domain_id(&state, &input.domain).await?;
    let category = category_id(&state, input.category.as_str()).await?;

    let playbook = PlaybookRepo::create(&state.pool, domain, category, &input).await?;
    state.event_bus.publish(
        ChangeEvent::new(entities::PLAYBOOK, actions::CREATED)
            .with_entity(playbook.id)
            .with_details(serde_json::json!({
                "name": playbook.name,
                "domain": playbook.domain,
                "category": playbook.category,
            })),
    );
    Ok((StatusCode::CREATED, Json(playbook)))
}

/// PATCH /api/playbooks/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePlaybook>,
) -> AppResult<Json<Playbook>> {
    validate_optional_name("name", input.name.as_deref())?;
    validate_custom_plan(
        input.budget_min,
        input.budget_max,
        input.estimated_duration_days,
        input.tasks.as_deref(),
    )?;
    let domain = match &input.domain {
        Some(slug) => Some(domain_id(&state, slug).await?),
        None => None,
    };
    let category = match input.category {
        Some(category) => Some(category_id(&state, category.as_str()).await?),
        None => None,
    };

    let playbook = PlaybookRepo::update(&state.pool, id, domain, category, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Playbook", id))?;
    state
        .event_bus
        .publish(ChangeEvent::new(entities::PLAYBOOK, actions::UPDATED).with_entity(id));
    Ok(Json(playbook))
}

/// DELETE /api/playbooks/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if !PlaybookRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Playbook", id).into());
    }
    state
        .event_bus
        .publish(ChangeEvent::new(entities::PLAYBOOK, actions::DELETED).with_entity(id));
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/playbooks/domains
pub async fn list_domains(State(state): State<AppState>) -> AppResult<Json<Vec<PlaybookGroup>>> {
    Ok(Json(PlaybookDomainRepo::list(&state.pool).await?))
}

/// GET /api/playbooks/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PlaybookGroup>>> {
    Ok(Json(PlaybookCategoryRepo::list(&state.pool).await?))
}

/// GET /api/playbooks/stats
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<PlaybookStats>> {
    Ok(Json(PlaybookRepo::stats(&state.pool).await?))
}

/// POST /api/playbooks/{id}/activate
///
/// Creates an `active` scenario linked to the playbook and one task per
/// template step, all in one transaction.
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ActivatePlaybook>,
) -> AppResult<(StatusCode, Json<Activation>)> {
    validate_optional_name("title", input.title.as_deref())?;
    let playbook = PlaybookRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Playbook", id))?;
    OrganizationRepo::find_by_id(&state.pool, input.organization_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Organization", input.organization_id))?;

    let scenario_input = CreateScenario {
        organization_id: input.organization_id,
        playbook_id: Some(playbook.id),
        owner_id: input.owner_id,
        title: input.title.clone().unwrap_or_else(|| playbook.name.clone()),
        description: playbook.description.clone(),
        status: Some(ScenarioStatus::Active),
        // Severity and priority share their wire values.
        priority: Some(playbook.severity.parse::<Priority>().unwrap_or_default()),
    };

    let now = Utc::now();
    let task_inputs = playbook
        .task_templates()
        .into_iter()
        .enumerate()
        .map(|(index, template)| -> AppResult<CreateTask> {
            let due_date = now
                .checked_add_signed(Duration::days(i64::from(template.offset_days)))
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Task '{}' has an out-of-range due date offset",
                        template.title
                    ))
                })?;
            Ok(CreateTask {
                title: template.title,
                description: Some(format!("{} (owner: {})", template.description, template.owner_role)),
                due_date: Some(due_date),
                sort_order: Some(index as i32),
                ..Default::default()
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let mut tx = state.pool.begin().await?;
    let scenario = ScenarioRepo::create_in(&mut *tx, &scenario_input).await?;
    let mut tasks = Vec::with_capacity(task_inputs.len());
    for task_input in &task_inputs {
        tasks.push(TaskRepo::create_in(&mut *tx, scenario.id, task_input).await?);
    }
    tx.commit().await?;

    tracing::info!(
        playbook_id = %playbook.id,
        scenario_id = %scenario.id,
        task_count = tasks.len(),
        "Playbook activated",
    );
    state.event_bus.publish(
        ChangeEvent::new(entities::PLAYBOOK, actions::ACTIVATED)
            .with_entity(playbook.id)
            .with_organization(scenario.organization_id)
            .with_details(serde_json::json!({
                "scenarioId": scenario.id,
                "taskCount": tasks.len(),
            })),
    );
    state.event_bus.publish(
        ChangeEvent::new(entities::SCENARIO, actions::CREATED)
            .with_entity(scenario.id)
            .with_organization(scenario.organization_id)
            .with_details(serde_json::json!({ "playbookId": playbook.id })),
    );

    Ok((StatusCode::CREATED, Json(Activation { scenario, tasks })))
}
