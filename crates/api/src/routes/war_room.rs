//! Route definitions for the `/war-rooms` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::war_room;
use crate::state::AppState;

/// Routes mounted at `/war-rooms`.
///
/// ```text
/// GET    /              -> list (?organizationId&status)
/// POST   /              -> create
/// GET    /{id}          -> get_by_id
/// PATCH  /{id}          -> update
/// POST   /{id}/start    -> start
/// POST   /{id}/end      -> end
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(war_room::list).post(war_room::create))
        .route("/{id}", get(war_room::get_by_id).patch(war_room::update))
        .route("/{id}/start", post(war_room::start))
        .route("/{id}/end", post(war_room::end))
}
