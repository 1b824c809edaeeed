//! Route definitions for the `/triggers` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::trigger;
use crate::state::AppState;

/// Routes mounted at `/triggers`.
///
/// ```text
/// GET    /                -> list (?organizationId&isActive&signalId)
/// POST   /                -> create
/// GET    /{id}            -> get_by_id
/// PATCH  /{id}            -> update
/// DELETE /{id}            -> delete
/// POST   /{id}/evaluate   -> evaluate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(trigger::list).post(trigger::create))
        .route(
            "/{id}",
            get(trigger::get_by_id)
                .patch(trigger::update)
                .delete(trigger::delete),
        )
        .route("/{id}/evaluate", post(trigger::evaluate))
}
