//! Route definitions for the `/organizations` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::organization;
use crate::state::AppState;

/// Routes mounted at `/organizations`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// PATCH  /{id}             -> update
/// DELETE /{id}             -> delete
/// GET    /{id}/dashboard   -> dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(organization::list).post(organization::create))
        .route(
            "/{id}",
            get(organization::get_by_id)
                .patch(organization::update)
                .delete(organization::delete),
        )
        .route("/{id}/dashboard", get(organization::dashboard))
}
