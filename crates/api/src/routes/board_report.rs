//! Route definitions for the `/board-reports` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::board_report;
use crate::state::AppState;

/// Routes mounted at `/board-reports`.
///
/// ```text
/// GET    /       -> list (?organizationId)
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// PATCH  /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(board_report::list).post(board_report::create))
        .route(
            "/{id}",
            get(board_report::get_by_id)
                .patch(board_report::update)
                .delete(board_report::delete),
        )
}
