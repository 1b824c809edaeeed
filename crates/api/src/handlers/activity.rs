//! Activity log query handler.

use axum::extract::{Query, State};
use axum::Json;
use bastion_db::models::activity::{ActivityFilter, ActivityPage};
use bastion_db::repositories::ActivityRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/activity?organizationId&entityType&action&limit&offset
///
/// Newest first. `total` counts every matching entry, ignoring paging.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ActivityFilter>,
) -> AppResult<Json<ActivityPage>> {
    let items = ActivityRepo::query(&state.pool, &filter).await?;
    let total = ActivityRepo::count(&state.pool, &filter).await?;
    Ok(Json(ActivityPage { items, total }))
}
