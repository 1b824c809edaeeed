//! Handlers for the `/board-reports` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bastion_core::activity::{actions, entities};
use bastion_core::error::CoreError;
use bastion_core::status::{validate_name, validate_optional_name};
use bastion_core::types::DbId;
use bastion_db::models::board_report::{
    BoardReport, BoardReportFilter, CreateBoardReport, UpdateBoardReport,
};
use bastion_db::repositories::BoardReportRepo;
use bastion_events::ChangeEvent;

use crate::error::AppResult;
use crate::state::AppState;

fn publish(state: &AppState, report: &BoardReport, action: &str) {
    state.event_bus.publish(
        ChangeEvent::new(entities::BOARD_REPORT, action)
            .with_entity(report.id)
            .with_organization(report.organization_id)
            .with_details(serde_json::json!({
                "title": report.title,
                "period": report.period,
            })),
    );
}

/// POST /api/board-reports
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateBoardReport>,
) -> AppResult<(StatusCode, Json<BoardReport>)> {
    validate_name("title", &input.title)?;

    let report = BoardReportRepo::create(&state.pool, &input).await?;
    publish(&state, &report, actions::CREATED);
    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /api/board-reports?organizationId
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<BoardReportFilter>,
) -> AppResult<Json<Vec<BoardReport>>> {
    let reports = BoardReportRepo::list(&state.pool, &filter).await?;
    Ok(Json(reports))
}

/// GET /api/board-reports/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<BoardReport>> {
    let report = BoardReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Board report", id))?;
    Ok(Json(report))
}

/// PATCH /api/board-reports/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBoardReport>,
) -> AppResult<Json<BoardReport>> {
    validate_optional_name("title", input.title.as_deref())?;

    let report = BoardReportRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Board report", id))?;
    publish(&state, &report, actions::UPDATED);
    Ok(Json(report))
}

/// DELETE /api/board-reports/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let report = BoardReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Board report", id))?;
    if !BoardReportRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Board report", id).into());
    }
    publish(&state, &report, actions::DELETED);
    Ok(StatusCode::NO_CONTENT)
}
