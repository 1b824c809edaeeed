use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::readiness::SeedState;
use crate::state::AppState;

/// Health check response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `starting`, `ok` or `degraded`.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Library seed state: `pending`, `ready` or `failed`.
    pub seed: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_error: Option<String>,
}

/// GET /health -- returns service, database and seed health.
///
/// 503 until the library seed has settled. A failed seed still answers 200
/// with `degraded` so the process keeps serving.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = bastion_db::health_check(&state.pool).await.is_ok();
    let seed = state.readiness.current().await;

    let (code, status) = match (&seed, db_healthy) {
        (SeedState::Pending, _) => (StatusCode::SERVICE_UNAVAILABLE, "starting"),
        (SeedState::Ready(_), true) => (StatusCode::OK, "ok"),
        _ => (StatusCode::OK, "degraded"),
    };
    let seed_error = match &seed {
        SeedState::Failed(e) => Some(e.clone()),
        _ => None,
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            seed: seed.label(),
            seed_error,
        }),
    )
}

/// Mount health check routes (root level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/_health", get(health_check))
}
