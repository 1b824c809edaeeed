//! Integration tests for the repository layer.
//!
//! - Organization -> scenario -> task hierarchy and cascade delete
//! - Unique and check constraint violations
//! - COALESCE patch semantics
//! - Alert and war-room lifecycle guards
//! - Dashboard aggregates

use assert_matches::assert_matches;
use bastion_core::status::{AlertStatus, Priority, ScenarioStatus, TaskStatus, UserRole};
use bastion_db::models::alert::CreateAlert;
use bastion_db::models::organization::{CreateOrganization, UpdateOrganization};
use bastion_db::models::scenario::{CreateScenario, ScenarioFilter, UpdateScenario};
use bastion_db::models::task::{CreateTask, TaskFilter, UpdateTask};
use bastion_db::models::trigger::CreateTrigger;
use bastion_db::models::user::CreateUser;
use bastion_db::models::war_room::CreateWarRoom;
use bastion_db::repositories::{
    AlertRepo, DashboardRepo, DemoRepo, OrganizationRepo, ScenarioRepo, SignalRepo, TaskRepo,
    TriggerRepo, UserRepo, WarRoomRepo,
};
use bastion_db::seed::ensure_library;
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_org(name: &str) -> CreateOrganization {
    CreateOrganization {
        name: name.to_string(),
        industry: Some("technology".into()),
        size: None,
        description: None,
        is_demo: false,
    }
}

fn new_user(organization_id: Uuid, email: &str) -> CreateUser {
    CreateUser {
        organization_id,
        name: "Ada Lovelace".into(),
        email: email.into(),
        title: None,
        role: None,
    }
}

fn new_scenario(organization_id: Uuid, title: &str) -> CreateScenario {
    CreateScenario {
        organization_id,
        playbook_id: None,
        owner_id: None,
        title: title.to_string(),
        description: None,
        status: None,
        priority: None,
    }
}

fn new_task(title: &str) -> CreateTask {
    CreateTask {
        title: title.to_string(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Hierarchy and cascades
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_hierarchy_with_defaults(pool: PgPool) {
    let org = OrganizationRepo::create(&pool, &new_org("  Acme  ")).await.unwrap();
    assert_eq!(org.name, "Acme");
    assert!(!org.is_demo);

    let user = UserRepo::create(&pool, &new_user(org.id, "Ada@Example.com"))
        .await
        .unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.role, UserRole::Analyst.as_str());

    let scenario = ScenarioRepo::create(&pool, &new_scenario(org.id, "Price war"))
        .await
        .unwrap();
    assert_eq!(scenario.status, "draft");
    assert_eq!(scenario.priority, "medium");

    let task = TaskRepo::create(&pool, scenario.id, &new_task("Model exposure"))
        .await
        .unwrap();
    assert_eq!(task.scenario_id, scenario.id);
    assert_eq!(task.status, "pending");
    assert!(task.completed_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_organization_cascades(pool: PgPool) {
    let org = OrganizationRepo::create(&pool, &new_org("Cascade")).await.unwrap();
    let scenario = ScenarioRepo::create(&pool, &new_scenario(org.id, "S1"))
        .await
        .unwrap();
    let task = TaskRepo::create(&pool, scenario.id, &new_task("T1")).await.unwrap();

    assert!(OrganizationRepo::delete(&pool, org.id).await.unwrap());
    assert!(ScenarioRepo::find_by_id(&pool, scenario.id).await.unwrap().is_none());
    assert!(TaskRepo::find_by_id(&pool, task.id).await.unwrap().is_none());

    assert!(!OrganizationRepo::delete(&pool, org.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_user_nulls_assignments(pool: PgPool) {
    let org = OrganizationRepo::create(&pool, &new_org("Org")).await.unwrap();
    let user = UserRepo::create(&pool, &new_user(org.id, "a@b.c")).await.unwrap();
    let scenario = ScenarioRepo::create(&pool, &new_scenario(org.id, "S")).await.unwrap();
    let task = TaskRepo::create(
        &pool,
        scenario.id,
        &CreateTask {
            assignee_id: Some(user.id),
            ..new_task("T")
        },
    )
    .await
    .unwrap();

    UserRepo::delete(&pool, user.id).await.unwrap();
    let task = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert!(task.assignee_id.is_none());
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_is_unique_violation(pool: PgPool) {
    let org = OrganizationRepo::create(&pool, &new_org("Org")).await.unwrap();
    UserRepo::create(&pool, &new_user(org.id, "dup@example.com"))
        .await
        .unwrap();

    let err = UserRepo::create(&pool, &new_user(org.id, "DUP@example.com"))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_organization_is_fk_violation(pool: PgPool) {
    let err = ScenarioRepo::create(&pool, &new_scenario(Uuid::new_v4(), "Orphan"))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23503")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_check_constraint(pool: PgPool) {
    let org = OrganizationRepo::create(&pool, &new_org("Org")).await.unwrap();
    let err = sqlx::query(
        "INSERT INTO strategic_scenarios (organization_id, title, status) VALUES ($1, 'x', 'paused')",
    )
    .bind(org.id)
    .execute(&pool)
    .await
    .unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23514")
    );
}

// ---------------------------------------------------------------------------
// Updates and filters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_applies_only_present_fields(pool: PgPool) {
    let org = OrganizationRepo::create(&pool, &new_org("Before")).await.unwrap();
    let updated = OrganizationRepo::update(
        &pool,
        org.id,
        &UpdateOrganization {
            name: Some("After".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "After");
    assert_eq!(updated.industry.as_deref(), Some("technology"));
    assert!(updated.updated_at >= org.updated_at);

    let missing = OrganizationRepo::update(&pool, Uuid::new_v4(), &UpdateOrganization::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_scenario_filters(pool: PgPool) {
    let org_a = OrganizationRepo::create(&pool, &new_org("A")).await.unwrap();
    let org_b = OrganizationRepo::create(&pool, &new_org("B")).await.unwrap();
    let s1 = ScenarioRepo::create(&pool, &new_scenario(org_a.id, "A1")).await.unwrap();
    ScenarioRepo::create(&pool, &new_scenario(org_a.id, "A2")).await.unwrap();
    ScenarioRepo::create(&pool, &new_scenario(org_b.id, "B1")).await.unwrap();

    ScenarioRepo::update(
        &pool,
        s1.id,
        &UpdateScenario {
            status: Some(ScenarioStatus::Voting),
            priority: Some(Priority::Critical),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let in_a = ScenarioRepo::list(
        &pool,
        &ScenarioFilter {
            organization_id: Some(org_a.id),
            status: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(in_a.len(), 2);

    let voting = ScenarioRepo::list(
        &pool,
        &ScenarioFilter {
            organization_id: None,
            status: Some(ScenarioStatus::Voting),
        },
    )
    .await
    .unwrap();
    assert_eq!(voting.len(), 1);
    assert_eq!(voting[0].id, s1.id);
    assert_eq!(voting[0].priority, "critical");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_completion_timestamp_follows_status(pool: PgPool) {
    let org = OrganizationRepo::create(&pool, &new_org("Org")).await.unwrap();
    let scenario = ScenarioRepo::create(&pool, &new_scenario(org.id, "S")).await.unwrap();
    let task = TaskRepo::create(&pool, scenario.id, &new_task("T")).await.unwrap();

    let done = TaskRepo::update(
        &pool,
        task.id,
        &UpdateTask {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(done.completed_at.is_some());

    let retitled = TaskRepo::update(
        &pool,
        task.id,
        &UpdateTask {
            title: Some("Renamed".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(retitled.completed_at, done.completed_at);

    let reopened = TaskRepo::update(
        &pool,
        task.id,
        &UpdateTask {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(reopened.completed_at.is_none());

    let by_status = TaskRepo::list(
        &pool,
        &TaskFilter {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_status.len(), 1);
}

// ---------------------------------------------------------------------------
// Lifecycles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_alert_lifecycle(pool: PgPool) {
    let org = OrganizationRepo::create(&pool, &new_org("Org")).await.unwrap();
    let alert = AlertRepo::create(
        &pool,
        &CreateAlert {
            organization_id: org.id,
            title: "Runway below plan".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(alert.status, AlertStatus::Open.as_str());

    let acked = AlertRepo::acknowledge(&pool, alert.id).await.unwrap().unwrap();
    assert_eq!(acked.status, "acknowledged");
    assert!(acked.acknowledged_at.is_some());
    assert!(AlertRepo::acknowledge(&pool, alert.id).await.unwrap().is_none());

    let resolved = AlertRepo::resolve(&pool, alert.id).await.unwrap().unwrap();
    assert_eq!(resolved.status, "resolved");
    assert!(resolved.resolved_at.is_some());
    assert_eq!(resolved.acknowledged_at, acked.acknowledged_at);
    assert!(AlertRepo::resolve(&pool, alert.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_war_room_start_and_end(pool: PgPool) {
    let org = OrganizationRepo::create(&pool, &new_org("Org")).await.unwrap();
    let session = WarRoomRepo::create(
        &pool,
        &CreateWarRoom {
            organization_id: org.id,
            scenario_id: None,
            title: "Tariff response".into(),
            objective: None,
            scheduled_for: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(session.status, "scheduled");

    let started = WarRoomRepo::start(&pool, session.id).await.unwrap().unwrap();
    let restarted = WarRoomRepo::start(&pool, session.id).await.unwrap().unwrap();
    assert_eq!(started.started_at, restarted.started_at);

    let ended = WarRoomRepo::end(&pool, session.id).await.unwrap().unwrap();
    assert_eq!(ended.status, "ended");
    assert!(WarRoomRepo::end(&pool, session.id).await.unwrap().is_none());
    assert!(WarRoomRepo::start(&pool, session.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_trigger_defaults_come_from_signal(pool: PgPool) {
    ensure_library(&pool).await.unwrap();
    let org = OrganizationRepo::create(&pool, &new_org("Org")).await.unwrap();
    let signal_id = SignalRepo::find_id_by_name(&pool, "Cash Runway")
        .await
        .unwrap()
        .unwrap();

    let trigger = TriggerRepo::create(
        &pool,
        &CreateTrigger {
            organization_id: org.id,
            signal_id: Some(signal_id),
            name: "Runway watch".into(),
            description: None,
            condition: None,
            threshold: None,
            severity: None,
            is_active: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(trigger.condition, "lt");
    assert_eq!(trigger.threshold, 12.0);
    assert!(trigger.is_active);

    let marked = TriggerRepo::mark_triggered(&pool, trigger.id).await.unwrap().unwrap();
    assert!(marked.last_triggered_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_and_reset(pool: PgPool) {
    ensure_library(&pool).await.unwrap();
    let org = OrganizationRepo::create(&pool, &new_org("Org")).await.unwrap();
    let scenario = ScenarioRepo::create(&pool, &new_scenario(org.id, "S")).await.unwrap();
    TaskRepo::create(
        &pool,
        scenario.id,
        &CreateTask {
            status: Some(TaskStatus::Completed),
            ..new_task("Done")
        },
    )
    .await
    .unwrap();
    TaskRepo::create(&pool, scenario.id, &new_task("Open")).await.unwrap();

    let dashboard = DashboardRepo::for_organization(&pool, org.clone()).await.unwrap();
    assert_eq!(dashboard.tasks_total, 2);
    assert_eq!(dashboard.tasks_completed, 1);
    assert!((dashboard.task_completion_ratio - 0.5).abs() < f64::EPSILON);
    assert_eq!(dashboard.scenarios_by_status.len(), 1);
    assert_eq!(dashboard.scenarios_by_status[0].key, "draft");

    let counts = DemoRepo::reset(&pool).await.unwrap();
    assert_eq!(counts.organizations, 1);
    assert!(OrganizationRepo::find_by_id(&pool, org.id).await.unwrap().is_none());

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM playbook_library")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 166);
}
