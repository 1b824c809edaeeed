//! Handlers for the `/users` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bastion_core::activity::{actions, entities};
use bastion_core::error::CoreError;
use bastion_core::status::{validate_name, validate_optional_name};
use bastion_core::types::DbId;
use bastion_db::models::user::{CreateUser, UpdateUser, User, UserFilter};
use bastion_db::repositories::UserRepo;
use bastion_events::ChangeEvent;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// `local@domain`: no whitespace, one `@`, and a dotted domain whose labels
/// are all non-empty.
fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = !email.contains(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && domain.split('.').all(|label| !label.is_empty())
            }
            None => false,
        };
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid email address '{email}'")))
    }
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    validate_name("name", &input.name)?;
    validate_email(&input.email)?;

    let user = UserRepo::create(&state.pool, &input).await?;
    state.event_bus.publish(
        ChangeEvent::new(entities::USER, actions::CREATED)
            .with_entity(user.id)
            .with_organization(user.organization_id)
            .with_details(serde_json::json!({ "role": user.role })),
    );
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users?organizationId&role
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> AppResult<Json<Vec<User>>> {
    let users = UserRepo::list(&state.pool, &filter).await?;
    Ok(Json(users))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<User>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;
    Ok(Json(user))
}

/// PATCH /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    validate_optional_name("name", input.name.as_deref())?;
    if let Some(email) = &input.email {
        validate_email(email)?;
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;
    state.event_bus.publish(
        ChangeEvent::new(entities::USER, actions::UPDATED)
            .with_entity(id)
            .with_organization(user.organization_id),
    );
    Ok(Json(user))
}

/// DELETE /api/users/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("User", id).into());
    }

    state.event_bus.publish(
        ChangeEvent::new(entities::USER, actions::DELETED)
            .with_entity(id)
            .with_organization(user.organization_id),
    );
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_local_part_and_dotted_domain() {
        assert!(validate_email("ceo@acme.com").is_ok());
        assert!(validate_email("ceo@localhost").is_err());
        assert!(validate_email("@acme.com").is_err());
        assert!(validate_email("acme.com").is_err());
    }

    #[test]
    fn email_rejects_whitespace_and_empty_domain_labels() {
        assert!(validate_email("  ceo@acme.co.uk ").is_ok());
        assert!(validate_email("a@.").is_err());
        assert!(validate_email("a@.acme.com").is_err());
        assert!(validate_email("a@acme.com.").is_err());
        assert!(validate_email("a@acme..com").is_err());
        assert!(validate_email("a b@c.d").is_err());
        assert!(validate_email("a@b@c.d").is_err());
    }
}
