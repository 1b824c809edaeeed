//! Handlers for the `/scenarios` resource, including the tasks nested
//! under a scenario.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bastion_core::activity::{actions, entities};
use bastion_core::error::CoreError;
use bastion_core::status::{validate_name, validate_optional_name};
use bastion_core::types::DbId;
use bastion_db::models::scenario::{CreateScenario, Scenario, ScenarioFilter, UpdateScenario};
use bastion_db::models::task::{CreateTask, Task, TaskFilter};
use bastion_db::repositories::{ScenarioRepo, TaskRepo};
use bastion_events::ChangeEvent;

use crate::error::AppResult;
use crate::state::AppState;

async fn ensure_scenario(state: &AppState, id: DbId) -> AppResult<Scenario> {
    let scenario = ScenarioRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Scenario", id))?;
    Ok(scenario)
}

/// POST /api/scenarios
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateScenario>,
) -> AppResult<(StatusCode, Json<Scenario>)> {
    validate_name("title", &input.title)?;

    let scenario = ScenarioRepo::create(&state.pool, &input).await?;
    state.event_bus.publish(
        ChangeEvent::new(entities::SCENARIO, actions::CREATED)
            .with_entity(scenario.id)
            .with_organization(scenario.organization_id)
            .with_details(serde_json::json!({
                "title": scenario.title,
                "status": scenario.status,
            })),
    );
    Ok((StatusCode::CREATED, Json(scenario)))
}

/// GET /api/scenarios?organizationId&status
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ScenarioFilter>,
) -> AppResult<Json<Vec<Scenario>>> {
    let scenarios = ScenarioRepo::list(&state.pool, &filter).await?;
    Ok(Json(scenarios))
}

/// GET /api/scenarios/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Scenario>> {
    Ok(Json(ensure_scenario(&state, id).await?))
}

/// PATCH /api/scenarios/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateScenario>,
) -> AppResult<Json<Scenario>> {
    validate_optional_name("title", input.title.as_deref())?;

    let scenario = ScenarioRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Scenario", id))?;

    let mut details = serde_json::Map::new();
    if let Some(status) = input.status {
        details.insert("status".into(), status.as_str().into());
    }
    state.event_bus.publish(
        ChangeEvent::new(entities::SCENARIO, actions::UPDATED)
            .with_entity(id)
            .with_organization(scenario.organization_id)
            .with_details(serde_json::Value::Object(details)),
    );
    Ok(Json(scenario))
}

/// DELETE /api/scenarios/{id}
///
/// Tasks under the scenario are removed with it.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let scenario = ensure_scenario(&state, id).await?;
    if !ScenarioRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Scenario", id).into());
    }

    state.event_bus.publish(
        ChangeEvent::new(entities::SCENARIO, actions::DELETED)
            .with_entity(id)
            .with_organization(scenario.organization_id),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/scenarios/{id}/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Task>>> {
    ensure_scenario(&state, id).await?;
    let filter = TaskFilter {
        scenario_id: Some(id),
        ..Default::default()
    };
    let tasks = TaskRepo::list(&state.pool, &filter).await?;
    Ok(Json(tasks))
}

/// POST /api/scenarios/{id}/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    validate_name("title", &input.title)?;
    let scenario = ensure_scenario(&state, id).await?;

    let task = TaskRepo::create(&state.pool, id, &input).await?;
    state.event_bus.publish(
        ChangeEvent::new(entities::TASK, actions::CREATED)
            .with_entity(task.id)
            .with_organization(scenario.organization_id)
            .with_details(serde_json::json!({ "scenarioId": id, "title": task.title })),
    );
    Ok((StatusCode::CREATED, Json(task)))
}
