//! Handlers for the flat `/tasks` resource. Creation lives under
//! `/scenarios/{id}/tasks`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bastion_core::activity::{actions, entities};
use bastion_core::error::CoreError;
use bastion_core::status::validate_optional_name;
use bastion_core::types::DbId;
use bastion_db::models::task::{Task, TaskFilter, UpdateTask};
use bastion_db::repositories::{ScenarioRepo, TaskRepo};
use bastion_events::ChangeEvent;

use crate::error::AppResult;
use crate::state::AppState;

/// Build a task event scoped to the owning scenario's organization.
async fn task_event(state: &AppState, task: &Task, action: &str) -> AppResult<ChangeEvent> {
    let mut event = ChangeEvent::new(entities::TASK, action)
        .with_entity(task.id)
        .with_details(serde_json::json!({
            "scenarioId": task.scenario_id,
            "status": task.status,
        }));
    if let Some(scenario) = ScenarioRepo::find_by_id(&state.pool, task.scenario_id).await? {
        event = event.with_organization(scenario.organization_id);
    }
    Ok(event)
}

/// GET /api/tasks?scenarioId&status&assigneeId
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> AppResult<Json<Vec<Task>>> {
    let tasks = TaskRepo::list(&state.pool, &filter).await?;
    Ok(Json(tasks))
}

/// GET /api/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Task>> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", id))?;
    Ok(Json(task))
}

/// PATCH /api/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    validate_optional_name("title", input.title.as_deref())?;

    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", id))?;
    state
        .event_bus
        .publish(task_event(&state, &task, actions::UPDATED).await?);
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", id))?;
    let event = task_event(&state, &task, actions::DELETED).await?;
    if !TaskRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Task", id).into());
    }

    state.event_bus.publish(event);
    Ok(StatusCode::NO_CONTENT)
}
