//! Handlers for executive briefings, including generation from live
//! organization state.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bastion_core::activity::{actions, entities};
use bastion_core::error::CoreError;
use bastion_core::status::{
    validate_name, validate_optional_name, AlertStatus, DocumentStatus, ScenarioStatus,
};
use bastion_core::types::DbId;
use bastion_db::models::alert::AlertFilter;
use bastion_db::models::briefing::{
    Briefing, BriefingFilter, CreateBriefing, GenerateBriefing, UpdateBriefing,
};
use bastion_db::models::scenario::ScenarioFilter;
use bastion_db::repositories::{ActivityRepo, AlertRepo, BriefingRepo, OrganizationRepo, ScenarioRepo};
use bastion_events::ChangeEvent;
use chrono::Utc;

use crate::briefing::{self as composer, BriefingInputs, ACTIVITY_LIMIT};
use crate::error::AppResult;
use crate::state::AppState;

fn publish(state: &AppState, briefing: &Briefing, action: &str) {
    state.event_bus.publish(
        ChangeEvent::new(entities::BRIEFING, action)
            .with_entity(briefing.id)
            .with_organization(briefing.organization_id)
            .with_details(serde_json::json!({ "title": briefing.title })),
    );
}

/// POST /api/briefings
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateBriefing>,
) -> AppResult<(StatusCode, Json<Briefing>)> {
    validate_name("title", &input.title)?;

    let briefing = BriefingRepo::create(&state.pool, &input).await?;
    publish(&state, &briefing, actions::CREATED);
    Ok((StatusCode::CREATED, Json(briefing)))
}

/// GET /api/briefings?organizationId&status
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<BriefingFilter>,
) -> AppResult<Json<Vec<Briefing>>> {
    let briefings = BriefingRepo::list(&state.pool, &filter).await?;
    Ok(Json(briefings))
}

/// GET /api/briefings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Briefing>> {
    let briefing = BriefingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Briefing", id))?;
    Ok(Json(briefing))
}

/// PATCH /api/briefings/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBriefing>,
) -> AppResult<Json<Briefing>> {
    validate_optional_name("title", input.title.as_deref())?;

    let briefing = BriefingRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Briefing", id))?;
    publish(&state, &briefing, actions::UPDATED);
    Ok(Json(briefing))
}

/// DELETE /api/briefings/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let briefing = BriefingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Briefing", id))?;
    if !BriefingRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Briefing", id).into());
    }
    publish(&state, &briefing, actions::DELETED);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/briefings/generate
///
/// Composes a draft briefing from the organization's active and voting
/// scenarios, open alerts and recent activity. The summary paragraph comes
/// from the configured model when available, otherwise from a template.
pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerateBriefing>,
) -> AppResult<(StatusCode, Json<Briefing>)> {
    validate_optional_name("title", input.title.as_deref())?;
    let organization = OrganizationRepo::find_by_id(&state.pool, input.organization_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Organization", input.organization_id))?;

    let mut scenarios = Vec::new();
    for status in [ScenarioStatus::Active, ScenarioStatus::Voting] {
        let filter = ScenarioFilter {
            organization_id: Some(organization.id),
            status: Some(status),
        };
        scenarios.extend(ScenarioRepo::list(&state.pool, &filter).await?);
    }
    let alerts = AlertRepo::list(
        &state.pool,
        &AlertFilter {
            organization_id: Some(organization.id),
            status: Some(AlertStatus::Open),
            severity: None,
        },
    )
    .await?;
    let activity =
        ActivityRepo::recent_for_organization(&state.pool, organization.id, ACTIVITY_LIMIT).await?;

    let inputs = BriefingInputs {
        organization,
        scenarios,
        alerts,
        activity,
    };
    let (summary, from_model) = state.briefing_writer.summarize(&inputs).await;
    let content = composer::compose(&inputs, &summary);

    let title = input.title.unwrap_or_else(|| {
        format!(
            "Executive Briefing: {} ({})",
            inputs.organization.name,
            Utc::now().format("%Y-%m-%d")
        )
    });
    let briefing = BriefingRepo::create(
        &state.pool,
        &CreateBriefing {
            organization_id: inputs.organization.id,
            title,
            summary: Some(summary),
            content: Some(content),
            status: Some(DocumentStatus::Draft),
            generated: true,
        },
    )
    .await?;

    tracing::info!(
        briefing_id = %briefing.id,
        organization_id = %briefing.organization_id,
        from_model,
        "Briefing generated",
    );
    state.event_bus.publish(
        ChangeEvent::new(entities::BRIEFING, actions::GENERATED)
            .with_entity(briefing.id)
            .with_organization(briefing.organization_id)
            .with_details(serde_json::json!({
                "title": briefing.title,
                "fromModel": from_model,
                "scenarioCount": inputs.scenarios.len(),
                "alertCount": inputs.alerts.len(),
            })),
    );
    Ok((StatusCode::CREATED, Json(briefing)))
}
