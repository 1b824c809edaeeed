//! Route definitions for the `/briefings` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::briefing;
use crate::state::AppState;

/// Routes mounted at `/briefings`.
///
/// ```text
/// GET    /           -> list (?organizationId&status)
/// POST   /           -> create
/// POST   /generate   -> generate
/// GET    /{id}       -> get_by_id
/// PATCH  /{id}       -> update
/// DELETE /{id}       -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(briefing::list).post(briefing::create))
        .route("/generate", post(briefing::generate))
        .route(
            "/{id}",
            get(briefing::get_by_id)
                .patch(briefing::update)
                .delete(briefing::delete),
        )
}
