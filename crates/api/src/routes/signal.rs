//! Route definitions for the signal catalogue.

use axum::routing::get;
use axum::Router;

use crate::handlers::signal;
use crate::state::AppState;

/// Routes mounted at `/signals`.
///
/// ```text
/// GET /                 -> list (?category)
/// GET /categories       -> list_categories
/// GET /{id}/playbooks   -> playbooks
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(signal::list))
        .route("/categories", get(signal::list_categories))
        .route("/{id}/playbooks", get(signal::playbooks))
}
