//! Handlers for the `/organizations` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bastion_core::activity::{actions, entities};
use bastion_core::error::CoreError;
use bastion_core::status::{validate_name, validate_optional_name};
use bastion_core::types::DbId;
use bastion_db::models::dashboard::OrganizationDashboard;
use bastion_db::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use bastion_db::repositories::{DashboardRepo, OrganizationRepo};
use bastion_events::ChangeEvent;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/organizations
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateOrganization>,
) -> AppResult<(StatusCode, Json<Organization>)> {
    validate_name("name", &input.name)?;

    let organization = OrganizationRepo::create(&state.pool, &input).await?;
    tracing::info!(organization_id = %organization.id, "Organization created");

    state.event_bus.publish(
        ChangeEvent::new(entities::ORGANIZATION, actions::CREATED)
            .with_entity(organization.id)
            .with_organization(organization.id)
            .with_details(serde_json::json!({ "name": organization.name })),
    );
    Ok((StatusCode::CREATED, Json(organization)))
}

/// GET /api/organizations
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Organization>>> {
    let organizations = OrganizationRepo::list(&state.pool).await?;
    Ok(Json(organizations))
}

/// GET /api/organizations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Organization>> {
    let organization = OrganizationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Organization", id))?;
    Ok(Json(organization))
}

/// PATCH /api/organizations/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrganization>,
) -> AppResult<Json<Organization>> {
    validate_optional_name("name", input.name.as_deref())?;

    let organization = OrganizationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Organization", id))?;

    state.event_bus.publish(
        ChangeEvent::new(entities::ORGANIZATION, actions::UPDATED)
            .with_entity(id)
            .with_organization(id),
    );
    Ok(Json(organization))
}

/// DELETE /api/organizations/{id}
///
/// Cascades to every row owned by the organization.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if !OrganizationRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Organization", id).into());
    }

    state.event_bus.publish(
        ChangeEvent::new(entities::ORGANIZATION, actions::DELETED)
            .with_entity(id)
            .with_organization(id),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/organizations/{id}/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<OrganizationDashboard>> {
    let organization = OrganizationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Organization", id))?;
    let dashboard = DashboardRepo::for_organization(&state.pool, organization).await?;
    Ok(Json(dashboard))
}
