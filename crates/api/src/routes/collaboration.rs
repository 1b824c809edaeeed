//! Route definitions for the decision-room REST view.

use axum::routing::get;
use axum::Router;

use crate::handlers::collaboration;
use crate::state::AppState;

/// Routes mounted at `/collaboration`.
///
/// ```text
/// GET    /rooms        -> list_rooms
/// POST   /rooms        -> create_room
/// GET    /rooms/{id}   -> get_room
/// DELETE /rooms/{id}   -> close_room
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/rooms",
            get(collaboration::list_rooms).post(collaboration::create_room),
        )
        .route(
            "/rooms/{id}",
            get(collaboration::get_room).delete(collaboration::close_room),
        )
}
