//! Integration tests for library seeding.

use bastion_db::models::playbook::PlaybookFilter;
use bastion_db::repositories::{PlaybookCategoryRepo, PlaybookRepo, SignalRepo};
use bastion_db::seed::ensure_library;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seed_inserts_full_library(pool: PgPool) {
    let report = ensure_library(&pool).await.unwrap();
    assert!(report.reseeded);
    assert_eq!(report.playbooks, 166);
    assert_eq!(report.signals, 48);
    assert!(report.links > 0);

    let categories = PlaybookCategoryRepo::list(&pool).await.unwrap();
    let counts: Vec<(String, i64)> = categories
        .into_iter()
        .map(|c| (c.slug, c.playbook_count))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("defense".to_string(), 56),
            ("offense".to_string(), 58),
            ("special_teams".to_string(), 52),
        ]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seed_is_idempotent(pool: PgPool) {
    let first = ensure_library(&pool).await.unwrap();
    let second = ensure_library(&pool).await.unwrap();

    assert!(!second.reseeded);
    assert_eq!(first.playbooks, second.playbooks);
    assert_eq!(first.signals, second.signals);
    assert_eq!(first.links, second.links);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_library_is_reseeded(pool: PgPool) {
    ensure_library(&pool).await.unwrap();
    sqlx::query(
        "DELETE FROM playbook_library
         WHERE id IN (SELECT id FROM playbook_library WHERE is_template LIMIT 10)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let report = ensure_library(&pool).await.unwrap();
    assert!(report.reseeded);
    assert_eq!(report.playbooks, 166);
    assert!(report.links > 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signal_links_stay_in_domain(pool: PgPool) {
    ensure_library(&pool).await.unwrap();

    let signals = SignalRepo::list(&pool, &Default::default()).await.unwrap();
    let signal = signals
        .iter()
        .find(|s| s.category == "cybersecurity")
        .expect("cybersecurity signal");

    let playbooks = SignalRepo::playbooks_for(&pool, signal.id).await.unwrap();
    assert!(!playbooks.is_empty());
    assert!(playbooks.len() <= 5);
    assert!(playbooks.iter().all(|p| p.domain == "cybersecurity"));
    assert!(playbooks
        .windows(2)
        .all(|w| w[0].relevance >= w[1].relevance));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_playbook_search_and_pagination(pool: PgPool) {
    ensure_library(&pool).await.unwrap();

    let all = PlaybookFilter::default();
    assert_eq!(PlaybookRepo::count(&pool, &all).await.unwrap(), 166);
    assert_eq!(PlaybookRepo::list(&pool, &all).await.unwrap().len(), 166);

    let page = PlaybookFilter {
        limit: Some(10),
        offset: Some(160),
        ..Default::default()
    };
    assert_eq!(PlaybookRepo::list(&pool, &page).await.unwrap().len(), 6);

    let by_domain = PlaybookFilter {
        domain: Some("financial".into()),
        ..Default::default()
    };
    let rows = PlaybookRepo::list(&pool, &by_domain).await.unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|p| p.domain == "financial"));
    assert!(rows.iter().all(|p| !p.task_templates().is_empty()));

    let stats = PlaybookRepo::stats(&pool).await.unwrap();
    assert_eq!(stats.total, 166);
    assert_eq!(stats.templates, 166);
    assert_eq!(stats.by_category.iter().map(|c| c.count).sum::<i64>(), 166);
}
