//! Application router and middleware.
//!
//! [`build_app_router`] is the single place the HTTP surface is assembled;
//! `main.rs` and `tests/common` both call it.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;
use crate::ws;

fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

/// Build the complete application: `/_health*`, `/ws`, and `/api/*`.
///
/// Outermost first, a request passes CORS, gets an `x-request-id`, is
/// traced, is bounded by the request timeout, and finally reaches the
/// panic guard in front of the handlers.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_tracing = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(request_id_header()));

    app_routes()
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(request_tracing)
        .layer(build_cors_layer(&config.cors_origins))
        .with_state(state)
}

fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(routes::health::router())
        .route("/ws", get(ws::ws_handler))
        .nest("/api", routes::api_routes())
}

/// CORS for the configured browser origins.
///
/// Entries that are not valid header values are dropped with a warning so
/// one typo in `CORS_ORIGINS` does not take the server down.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, request_id_header()])
        .expose_headers([request_id_header(), HeaderName::from_static("x-total-count")])
        .max_age(Duration::from_secs(3600))
}
