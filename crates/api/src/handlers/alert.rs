//! Handlers for alerts and their acknowledge/resolve lifecycle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bastion_core::activity::{actions, entities};
use bastion_core::error::CoreError;
use bastion_core::status::{validate_name, validate_optional_name, AlertStatus};
use bastion_core::types::DbId;
use bastion_db::models::alert::{Alert, AlertFilter, CreateAlert, UpdateAlert};
use bastion_db::repositories::AlertRepo;
use bastion_events::ChangeEvent;

use crate::error::AppResult;
use crate::state::AppState;

async fn find(state: &AppState, id: DbId) -> AppResult<Alert> {
    let alert = AlertRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Alert", id))?;
    Ok(alert)
}

fn publish(state: &AppState, alert: &Alert, action: &str) {
    state.event_bus.publish(
        ChangeEvent::new(entities::ALERT, action)
            .with_entity(alert.id)
            .with_organization(alert.organization_id)
            .with_details(serde_json::json!({
                "status": alert.status,
                "severity": alert.severity,
            })),
    );
}

/// POST /api/alerts
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateAlert>,
) -> AppResult<(StatusCode, Json<Alert>)> {
    validate_name("title", &input.title)?;

    let alert = AlertRepo::create(&state.pool, &input).await?;
    publish(&state, &alert, actions::CREATED);
    Ok((StatusCode::CREATED, Json(alert)))
}

/// GET /api/alerts?organizationId&status&severity
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<AlertFilter>,
) -> AppResult<Json<Vec<Alert>>> {
    let alerts = AlertRepo::list(&state.pool, &filter).await?;
    Ok(Json(alerts))
}

/// GET /api/alerts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Alert>> {
    Ok(Json(find(&state, id).await?))
}

/// PATCH /api/alerts/{id}
///
/// Status moves only through `acknowledge` and `resolve`.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAlert>,
) -> AppResult<Json<Alert>> {
    validate_optional_name("title", input.title.as_deref())?;

    let alert = AlertRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Alert", id))?;
    publish(&state, &alert, actions::UPDATED);
    Ok(Json(alert))
}

/// DELETE /api/alerts/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let alert = find(&state, id).await?;
    if !AlertRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Alert", id).into());
    }
    publish(&state, &alert, actions::DELETED);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/alerts/{id}/acknowledge
///
/// Acknowledging an already acknowledged alert returns it unchanged; a
/// resolved alert cannot be acknowledged (409).
pub async fn acknowledge(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Alert>> {
    if let Some(alert) = AlertRepo::acknowledge(&state.pool, id).await? {
        publish(&state, &alert, actions::ACKNOWLEDGED);
        return Ok(Json(alert));
    }

    let current = find(&state, id).await?;
    if current.status == AlertStatus::Resolved.as_str() {
        return Err(CoreError::Conflict(format!("Alert {id} is already resolved")).into());
    }
    Ok(Json(current))
}

/// POST /api/alerts/{id}/resolve
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Alert>> {
    if let Some(alert) = AlertRepo::resolve(&state.pool, id).await? {
        publish(&state, &alert, actions::RESOLVED);
        return Ok(Json(alert));
    }

    // Distinguish a missing alert (404) from one already resolved (409).
    find(&state, id).await?;
    Err(CoreError::Conflict(format!("Alert {id} is already resolved")).into())
}
