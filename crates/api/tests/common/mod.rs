//! Shared helpers for the API integration tests.
//!
//! Requests are sent straight into the router via `tower::ServiceExt`, so no
//! TCP listener is needed except in the socket tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, Response};
use axum::Router;
use bastion_api::config::ServerConfig;
use bastion_api::router::build_app_router;
use bastion_api::state::AppState;
use bastion_db::seed::SeedReport;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// No model key is set, so briefing generation always uses the template
/// summary.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        node_env: "test".to_string(),
        log_level: None,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        openai_api_key: None,
        openai_model: "gpt-4o-mini".to_string(),
    }
}

/// State with readiness already settled, as after a successful startup seed.
pub async fn build_test_state(pool: PgPool) -> AppState {
    let state = AppState::new(pool, test_config());
    state
        .readiness
        .mark_ready(SeedReport {
            playbooks: 0,
            signals: 0,
            links: 0,
            reseeded: false,
        })
        .await;
    state
}

/// Build the full application router (same middleware stack as `main.rs`).
pub async fn build_test_app(pool: PgPool) -> Router {
    let state = build_test_state(pool).await;
    build_app_router(state, &test_config())
}

/// Build a router around existing state, to inspect services afterwards.
pub fn app_with_state(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn with_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    with_json(app, Method::POST, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    with_json(app, Method::PATCH, uri, body).await
}

/// POST with no body at all (action endpoints such as `/start`).
pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create an organization and return its id.
pub async fn create_organization(app: Router, name: &str) -> String {
    let response = post_json(app, "/api/organizations", serde_json::json!({ "name": name })).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}
