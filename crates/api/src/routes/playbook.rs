//! Route definitions for the playbook library.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::playbook;
use crate::state::AppState;

/// Routes mounted at `/playbooks`.
///
/// The static segments (`domains`, `categories`, `stats`) take precedence
/// over `/{id}`.
///
/// ```text
/// GET    /                -> list (?domain&category&severity&search&limit&offset)
/// POST   /                -> create
/// GET    /domains         -> list_domains
/// GET    /categories      -> list_categories
/// GET    /stats           -> stats
/// GET    /{id}            -> get_by_id
/// PATCH  /{id}            -> update
/// DELETE /{id}            -> delete
/// POST   /{id}/activate   -> activate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(playbook::list).post(playbook::create))
        .route("/domains", get(playbook::list_domains))
        .route("/categories", get(playbook::list_categories))
        .route("/stats", get(playbook::stats))
        .route(
            "/{id}",
            get(playbook::get_by_id)
                .patch(playbook::update)
                .delete(playbook::delete),
        )
        .route("/{id}/activate", post(playbook::activate))
}
