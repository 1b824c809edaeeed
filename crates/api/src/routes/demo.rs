//! Route definitions for demo data management.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::demo;
use crate::state::AppState;

/// Routes mounted at `/demo`.
///
/// ```text
/// POST   /generate   -> generate
/// DELETE /reset      -> reset
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(demo::generate))
        .route("/reset", delete(demo::reset))
}
