//! Route definitions for the `/scenarios` resource.
//!
//! Task creation is nested under its scenario; the flat task routes live
//! in [`super::task`].

use axum::routing::get;
use axum::Router;

use crate::handlers::scenario;
use crate::state::AppState;

/// Routes mounted at `/scenarios`.
///
/// ```text
/// GET    /              -> list (?organizationId&status)
/// POST   /              -> create
/// GET    /{id}          -> get_by_id
/// PATCH  /{id}          -> update
/// DELETE /{id}          -> delete
/// GET    /{id}/tasks    -> list_tasks
/// POST   /{id}/tasks    -> create_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(scenario::list).post(scenario::create))
        .route(
            "/{id}",
            get(scenario::get_by_id)
                .patch(scenario::update)
                .delete(scenario::delete),
        )
        .route(
            "/{id}/tasks",
            get(scenario::list_tasks).post(scenario::create_task),
        )
}
