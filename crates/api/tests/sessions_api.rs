//! Integration tests for war-room sessions and their decision rooms, the
//! REST room endpoints, briefings, board reports and demo data.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use bastion_core::demo::{
    DEMO_ALERT_COUNT, DEMO_SCENARIO_COUNT, DEMO_TRIGGER_COUNT, DEMO_USER_COUNT,
};
use bastion_db::seed::ensure_library;
use common::{body_json, create_organization, delete, get, patch_json, post_empty, post_json};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// War rooms
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn war_room_start_opens_and_end_closes_its_room(pool: PgPool) {
    let state = common::build_test_state(pool).await;
    let collab = Arc::clone(&state.collab);
    let app = common::app_with_state(state);
    let org = create_organization(app.clone(), "Acme").await;

    let response = post_json(
        app.clone(),
        "/api/war-rooms",
        json!({ "organizationId": org, "title": "Liquidity crunch", "objective": "Pick a bridge option" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let session = body_json(response).await;
    assert_eq!(session["status"], "scheduled");
    let id = session["id"].as_str().unwrap().to_string();

    let response = post_empty(app.clone(), &format!("/api/war-rooms/{id}/start")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let started = body_json(response).await;
    assert_eq!(started["status"], "active");
    assert!(started["startedAt"].is_string());

    // The decision room shares the session id.
    let response = get(app.clone(), &format!("/api/collaboration/rooms/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let room = body_json(response).await;
    assert_eq!(room["name"], "Liquidity crunch");
    assert_eq!(room["phase"], "briefing");

    // Starting again keeps the same session and room.
    let response = post_empty(app.clone(), &format!("/api/war-rooms/{id}/start")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["startedAt"], started["startedAt"]);
    assert_eq!(collab.room_count().await, 1);

    let response = post_empty(app.clone(), &format!("/api/war-rooms/{id}/end")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let ended = body_json(response).await;
    assert_eq!(ended["status"], "ended");
    assert!(ended["endedAt"].is_string());
    assert!(collab.room_snapshot(&id).await.is_none());

    let response = post_empty(app.clone(), &format!("/api/war-rooms/{id}/end")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_empty(app, &format!("/api/war-rooms/{id}/start")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn war_room_actions_on_missing_session_return_404(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let id = uuid::Uuid::new_v4();

    let response = post_empty(app.clone(), &format!("/api/war-rooms/{id}/start")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_empty(app, &format!("/api/war-rooms/{id}/end")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn war_rooms_filter_by_status(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let org = create_organization(app.clone(), "Acme").await;

    let mut ids = Vec::new();
    for title in ["Quarterly review", "Recall response"] {
        let response = post_json(
            app.clone(),
            "/api/war-rooms",
            json!({ "organizationId": org, "title": title }),
        )
        .await;
        ids.push(body_json(response).await["id"].as_str().unwrap().to_string());
    }
    post_empty(app.clone(), &format!("/api/war-rooms/{}/start", ids[1])).await;

    let active = body_json(
        get(app.clone(), &format!("/api/war-rooms?organizationId={org}&status=active")).await,
    )
    .await;
    let active = active.as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["title"], "Recall response");

    let response = patch_json(
        app,
        &format!("/api/war-rooms/{}", ids[0]),
        json!({ "objective": "Approve the plan" }),
    )
    .await;
    assert_eq!(body_json(response).await["objective"], "Approve the plan");
}

// ---------------------------------------------------------------------------
// Decision rooms over REST
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn rooms_can_be_created_listed_and_closed(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = post_json(
        app.clone(),
        "/api/collaboration/rooms",
        json!({ "name": "  Pricing response  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let room = body_json(response).await;
    assert_eq!(room["name"], "Pricing response");
    assert_eq!(room["participants"], json!([]));
    let id = room["id"].as_str().unwrap().to_string();

    let rooms = body_json(get(app.clone(), "/api/collaboration/rooms").await).await;
    let rooms = rooms.as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["participantCount"], 0);

    let response = delete(app.clone(), &format!("/api/collaboration/rooms/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(app.clone(), &format!("/api/collaboration/rooms/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, &format!("/api/collaboration/rooms/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_room_name_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = post_json(app, "/api/collaboration/rooms", json!({ "name": " " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "name must not be empty");
}

// ---------------------------------------------------------------------------
// Briefings and board reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn generated_briefing_uses_template_summary(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let org = create_organization(app.clone(), "Acme").await;

    post_json(
        app.clone(),
        "/api/scenarios",
        json!({ "organizationId": org, "title": "Key customer exit", "status": "active", "priority": "critical" }),
    )
    .await;
    post_json(
        app.clone(),
        "/api/alerts",
        json!({ "organizationId": org, "title": "Churn spike", "severity": "critical" }),
    )
    .await;

    let response = post_json(
        app.clone(),
        "/api/briefings/generate",
        json!({ "organizationId": org }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let briefing = body_json(response).await;
    assert_eq!(briefing["generated"], true);
    assert_eq!(briefing["status"], "draft");
    assert!(briefing["title"]
        .as_str()
        .unwrap()
        .starts_with("Executive Briefing: Acme ("));
    assert_eq!(
        briefing["summary"],
        "Acme is tracking 1 active scenario and 1 open alert. \
         1 alert is rated high or critical and should be reviewed first."
    );

    let content = briefing["content"].as_str().unwrap();
    assert!(content.contains("## Active Scenarios"));
    assert!(content.contains("- **Key customer exit** (critical priority, active)"));
    assert!(content.contains("- [CRITICAL] Churn spike"));

    let listed = body_json(get(app, &format!("/api/briefings?organizationId={org}")).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn briefing_for_missing_organization_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = post_json(
        app,
        "/api/briefings/generate",
        json!({ "organizationId": uuid::Uuid::new_v4() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manual_briefing_and_board_report_crud(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let org = create_organization(app.clone(), "Acme").await;

    let response = post_json(
        app.clone(),
        "/api/briefings",
        json!({ "organizationId": org, "title": "Monday note", "content": "All quiet." }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let briefing = body_json(response).await;
    assert_eq!(briefing["generated"], false);
    let briefing_id = briefing["id"].as_str().unwrap().to_string();

    let response = patch_json(
        app.clone(),
        &format!("/api/briefings/{briefing_id}"),
        json!({ "status": "published" }),
    )
    .await;
    assert_eq!(body_json(response).await["status"], "published");

    let response = post_json(
        app.clone(),
        "/api/board-reports",
        json!({ "organizationId": org, "title": "Q3 risk report", "period": "2026-Q3" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let report = body_json(response).await;
    assert_eq!(report["period"], "2026-Q3");
    let report_id = report["id"].as_str().unwrap().to_string();

    let response = delete(app.clone(), &format!("/api/board-reports/{report_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get(app.clone(), &format!("/api/board-reports/{report_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(app, &format!("/api/briefings/{briefing_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Demo data
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn demo_generate_populates_a_tenant(pool: PgPool) {
    ensure_library(&pool).await.unwrap();
    let app = common::build_test_app(pool).await;

    let response = post_json(
        app.clone(),
        "/api/demo/generate",
        json!({ "organizationName": "Acme Corp", "industry": "healthcare" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let summary = body_json(response).await;
    assert_eq!(summary["organizationName"], "Acme Corp");
    assert_eq!(summary["industry"], "healthcare");
    assert_eq!(summary["userIds"].as_array().unwrap().len(), DEMO_USER_COUNT);
    assert_eq!(summary["scenarioIds"].as_array().unwrap().len(), DEMO_SCENARIO_COUNT);
    assert_eq!(summary["triggerIds"].as_array().unwrap().len(), DEMO_TRIGGER_COUNT);
    assert_eq!(summary["alertIds"].as_array().unwrap().len(), DEMO_ALERT_COUNT);
    assert!(summary["taskCount"].as_u64().unwrap() >= 3 * DEMO_SCENARIO_COUNT as u64);

    let org = summary["organizationId"].as_str().unwrap().to_string();
    let organization = body_json(get(app.clone(), &format!("/api/organizations/{org}")).await).await;
    assert_eq!(organization["isDemo"], true);

    let alerts = body_json(get(app.clone(), &format!("/api/alerts?organizationId={org}")).await).await;
    assert!(alerts
        .as_array()
        .unwrap()
        .iter()
        .all(|a| !a["recommendedPlaybookIds"].as_array().unwrap().is_empty()));

    // A second tenant with the same name does not collide on user emails.
    let response = post_json(
        app,
        "/api/demo/generate",
        json!({ "organizationName": "Acme Corp" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn demo_generate_accepts_an_empty_body(pool: PgPool) {
    ensure_library(&pool).await.unwrap();
    let app = common::build_test_app(pool).await;

    let response = post_empty(app, "/api/demo/generate").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let summary = body_json(response).await;
    assert!(summary["organizationName"]
        .as_str()
        .unwrap()
        .ends_with("(Demo)"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn demo_generate_without_signals_is_unavailable(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = post_empty(app.clone(), "/api/demo/generate").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // The partial tenant is rolled back.
    let organizations = body_json(get(app, "/api/organizations").await).await;
    assert_eq!(organizations, json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn demo_reset_wipes_tenants_and_rooms(pool: PgPool) {
    ensure_library(&pool).await.unwrap();
    let app = common::build_test_app(pool).await;

    post_empty(app.clone(), "/api/demo/generate").await;
    create_organization(app.clone(), "Hand-made").await;
    post_json(app.clone(), "/api/collaboration/rooms", json!({ "name": "Scratch" })).await;

    let response = delete(app.clone(), "/api/demo/reset").await;
    assert_eq!(response.status(), StatusCode::OK);
    let reset = body_json(response).await;
    assert_eq!(reset["organizations"], 2);
    assert_eq!(reset["roomsClosed"], 1);

    let organizations = body_json(get(app.clone(), "/api/organizations").await).await;
    assert_eq!(organizations, json!([]));
    let rooms = body_json(get(app.clone(), "/api/collaboration/rooms").await).await;
    assert_eq!(rooms, json!([]));

    // The library survives a reset.
    let signals = body_json(get(app, "/api/signals").await).await;
    assert_eq!(signals.as_array().unwrap().len(), 48);
}
