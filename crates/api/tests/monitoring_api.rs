//! Integration tests for standalone triggers and the alert lifecycle.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{body_json, create_organization, delete, get, patch_json, post_empty, post_json};
use serde_json::json;
use sqlx::PgPool;

async fn create_trigger(app: Router, org: &str, threshold: f64, severity: &str) -> String {
    let response = post_json(
        app,
        "/api/triggers",
        json!({
            "organizationId": org,
            "name": "Revenue alarm",
            "condition": "gt",
            "threshold": threshold,
            "severity": severity,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

async fn create_alert(app: Router, org: &str) -> String {
    let response = post_json(
        app,
        "/api/alerts",
        json!({ "organizationId": org, "title": "Supplier default", "severity": "high" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let alert = body_json(response).await;
    assert_eq!(alert["status"], "open");
    alert["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn trigger_without_signal_requires_threshold(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let org = create_organization(app.clone(), "Acme").await;

    let response = post_json(
        app,
        "/api/triggers",
        json!({ "organizationId": org, "name": "Unanchored" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "threshold is required when no signalId is given"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn evaluation_fires_only_past_the_threshold(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let org = create_organization(app.clone(), "Acme").await;
    let trigger = create_trigger(app.clone(), &org, 100.0, "low").await;
    let uri = format!("/api/triggers/{trigger}/evaluate");

    let evaluation = body_json(post_json(app.clone(), &uri, json!({ "value": 100 })).await).await;
    assert_eq!(evaluation["fired"], false);

    // A small overshoot lifts the configured `low` to `medium`.
    let evaluation = body_json(post_json(app.clone(), &uri, json!({ "value": 105 })).await).await;
    assert_eq!(evaluation["fired"], true);
    assert_eq!(evaluation["alert"]["severity"], "medium");
    assert_eq!(evaluation["alert"]["title"], "Revenue alarm triggered");
    assert_eq!(
        evaluation["alert"]["message"],
        "Revenue alarm is 105, above the threshold of 100"
    );
    assert_eq!(
        evaluation["alert"]["recommendedPlaybookIds"],
        json!([])
    );

    let evaluation = body_json(post_json(app.clone(), &uri, json!({ "value": 150 })).await).await;
    assert_eq!(evaluation["alert"]["severity"], "critical");

    let alerts = body_json(get(app, &format!("/api/alerts?organizationId={org}&status=open")).await).await;
    assert_eq!(alerts.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn change_pct_needs_a_baseline(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let org = create_organization(app.clone(), "Acme").await;

    let response = post_json(
        app.clone(),
        "/api/triggers",
        json!({
            "organizationId": org,
            "name": "Price swing",
            "condition": "change_pct",
            "threshold": 10,
        }),
    )
    .await;
    let trigger = body_json(response).await["id"].as_str().unwrap().to_string();
    let uri = format!("/api/triggers/{trigger}/evaluate");

    let evaluation = body_json(post_json(app.clone(), &uri, json!({ "value": 80 })).await).await;
    assert_eq!(evaluation["fired"], false);

    let evaluation = body_json(
        post_json(app, &uri, json!({ "value": 80, "baseline": 100 })).await,
    )
    .await;
    assert_eq!(evaluation["fired"], true);
    assert_eq!(evaluation["alert"]["severity"], "critical");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inactive_trigger_cannot_be_evaluated(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let org = create_organization(app.clone(), "Acme").await;
    let trigger = create_trigger(app.clone(), &org, 10.0, "high").await;

    let response = patch_json(
        app.clone(),
        &format!("/api/triggers/{trigger}"),
        json!({ "isActive": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["isActive"], false);

    let response = post_json(
        app.clone(),
        &format!("/api/triggers/{trigger}/evaluate"),
        json!({ "value": 50 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app,
        &format!("/api/triggers/{}/evaluate", uuid::Uuid::new_v4()),
        json!({ "value": 50 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn trigger_delete_keeps_raised_alerts(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let org = create_organization(app.clone(), "Acme").await;
    let trigger = create_trigger(app.clone(), &org, 1.0, "medium").await;

    let evaluation = body_json(
        post_json(
            app.clone(),
            &format!("/api/triggers/{trigger}/evaluate"),
            json!({ "value": 2 }),
        )
        .await,
    )
    .await;
    let alert_id = evaluation["alert"]["id"].as_str().unwrap().to_string();

    let response = delete(app.clone(), &format!("/api/triggers/{trigger}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let alert = body_json(get(app, &format!("/api/alerts/{alert_id}")).await).await;
    assert_eq!(alert["triggerId"], serde_json::Value::Null);
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn alert_acknowledge_then_resolve(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let org = create_organization(app.clone(), "Acme").await;
    let alert = create_alert(app.clone(), &org).await;

    let response = post_empty(app.clone(), &format!("/api/alerts/{alert}/acknowledge")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let acknowledged = body_json(response).await;
    assert_eq!(acknowledged["status"], "acknowledged");
    assert!(acknowledged["acknowledgedAt"].is_string());

    // Acknowledging twice leaves the alert as it was.
    let response = post_empty(app.clone(), &format!("/api/alerts/{alert}/acknowledge")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["acknowledgedAt"],
        acknowledged["acknowledgedAt"]
    );

    let response = post_empty(app.clone(), &format!("/api/alerts/{alert}/resolve")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let resolved = body_json(response).await;
    assert_eq!(resolved["status"], "resolved");
    assert!(resolved["resolvedAt"].is_string());

    let response = post_empty(app.clone(), &format!("/api/alerts/{alert}/resolve")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_empty(app, &format!("/api/alerts/{alert}/acknowledge")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn open_alert_can_be_resolved_directly(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let org = create_organization(app.clone(), "Acme").await;
    let alert = create_alert(app.clone(), &org).await;

    let response = post_empty(app.clone(), &format!("/api/alerts/{alert}/resolve")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "resolved");

    let resolved = body_json(
        get(app, &format!("/api/alerts?organizationId={org}&status=resolved")).await,
    )
    .await;
    assert_eq!(resolved.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lifecycle_actions_on_missing_alert_return_404(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let id = uuid::Uuid::new_v4();

    let response = post_empty(app.clone(), &format!("/api/alerts/{id}/acknowledge")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_empty(app, &format!("/api/alerts/{id}/resolve")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
