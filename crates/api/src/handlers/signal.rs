//! Read-only handlers for the seeded signal catalogue.

use axum::extract::{Path, Query, State};
use axum::Json;
use bastion_core::error::CoreError;
use bastion_core::signals::{self, SignalCategory, SIGNAL_CATEGORIES};
use bastion_core::types::DbId;
use bastion_db::models::signal::{SignalFilter, SignalPlaybook, TriggerSignal};
use bastion_db::repositories::SignalRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/signals?category
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<SignalFilter>,
) -> AppResult<Json<Vec<TriggerSignal>>> {
    if let Some(category) = &filter.category {
        signals::validate_category(category)?;
    }
    let signals = SignalRepo::list(&state.pool, &filter).await?;
    Ok(Json(signals))
}

/// GET /api/signals/categories
pub async fn list_categories() -> Json<&'static [SignalCategory]> {
    Json(SIGNAL_CATEGORIES)
}

/// GET /api/signals/{id}/playbooks
pub async fn playbooks(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<SignalPlaybook>>> {
    SignalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Signal", id))?;
    let playbooks = SignalRepo::playbooks_for(&state.pool, id).await?;
    Ok(Json(playbooks))
}
