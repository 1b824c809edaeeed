//! Idempotent seeding of the playbook library and signal catalogue.
//!
//! Runs at startup. The content is derived in `bastion_core::library` and
//! `bastion_core::signals`; this module only writes it. Everything happens in
//! one transaction so a concurrent reader never sees a half-seeded library.

use std::collections::HashMap;

use bastion_core::library::{
    derive_library, rank_for_domain, StrategicCategory, EXPECTED_PLAYBOOK_COUNT,
};
use bastion_core::signals::{SIGNAL_CATEGORIES, SIGNAL_DEFINITIONS};
use bastion_core::types::DbId;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

/// Outcome of [`ensure_library`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    /// Template playbooks present after seeding.
    pub playbooks: i64,
    pub signals: i64,
    pub links: i64,
    /// `true` if the template library was (re)inserted on this run.
    pub reseeded: bool,
}

/// Make sure the lookup tables, the 166 template playbooks, the signal
/// catalogue and the signal-to-playbook links are all present.
pub async fn ensure_library(pool: &PgPool) -> Result<SeedReport, sqlx::Error> {
    let mut tx = pool.begin().await?;

    upsert_lookups(&mut *tx).await?;

    let existing = count(&mut *tx, "playbook_library WHERE is_template").await?;
    let reseeded = existing < EXPECTED_PLAYBOOK_COUNT as i64;
    if reseeded {
        tracing::info!(existing, expected = EXPECTED_PLAYBOOK_COUNT, "Seeding playbook library");
        sqlx::query("DELETE FROM signal_playbook_links")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM playbook_library WHERE is_template")
            .execute(&mut *tx)
            .await?;
        insert_templates(&mut *tx).await?;
    }

    let signals = count(&mut *tx, "trigger_signals").await?;
    if signals < SIGNAL_DEFINITIONS.len() as i64 {
        tracing::info!(existing = signals, "Seeding signal catalogue");
        insert_signals(&mut *tx).await?;
    }

    if count(&mut *tx, "signal_playbook_links").await? == 0 {
        link_signals(&mut *tx).await?;
    }

    let report = SeedReport {
        playbooks: count(&mut *tx, "playbook_library WHERE is_template").await?,
        signals: count(&mut *tx, "trigger_signals").await?,
        links: count(&mut *tx, "signal_playbook_links").await?,
        reseeded,
    };

    tx.commit().await?;
    tracing::info!(
        playbooks = report.playbooks,
        signals = report.signals,
        links = report.links,
        reseeded = report.reseeded,
        "Content library ready"
    );
    Ok(report)
}

/// `SELECT COUNT(*)` over a fixed table expression.
async fn count(conn: &mut PgConnection, from: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*)::BIGINT FROM {from}"))
        .fetch_one(conn)
        .await
}

async fn upsert_lookups(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    for category in StrategicCategory::ALL {
        sqlx::query(
            "INSERT INTO playbook_categories (slug, name, description)
             VALUES ($1, $2, $3)
             ON CONFLICT (slug) DO UPDATE
                SET name = EXCLUDED.name, description = EXCLUDED.description",
        )
        .bind(category.as_str())
        .bind(category.display_name())
        .bind(category.description())
        .execute(&mut *conn)
        .await?;
    }

    for domain in SIGNAL_CATEGORIES {
        sqlx::query(
            "INSERT INTO playbook_domains (slug, name, description)
             VALUES ($1, $2, $3)
             ON CONFLICT (slug) DO UPDATE
                SET name = EXCLUDED.name, description = EXCLUDED.description",
        )
        .bind(domain.slug)
        .bind(domain.name)
        .bind(domain.description)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn slug_ids(
    conn: &mut PgConnection,
    table: &str,
) -> Result<HashMap<String, DbId>, sqlx::Error> {
    let rows: Vec<(String, DbId)> = sqlx::query_as(&format!("SELECT slug, id FROM {table}"))
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().collect())
}

async fn insert_templates(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    let categories = slug_ids(conn, "playbook_categories").await?;
    let domains = slug_ids(conn, "playbook_domains").await?;

    for seed in derive_library() {
        let (Some(&category_id), Some(&domain_id)) = (
            categories.get(seed.category.as_str()),
            domains.get(seed.domain),
        ) else {
            tracing::warn!(
                playbook = seed.name,
                domain = seed.domain,
                "Skipping playbook with unknown lookup"
            );
            continue;
        };

        sqlx::query(
            "INSERT INTO playbook_library
                (name, description, domain_id, category_id, severity, frequency,
                 budget_min, budget_max, estimated_duration_days, stakeholders, tasks, is_template)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE)",
        )
        .bind(seed.name)
        .bind(&seed.description)
        .bind(domain_id)
        .bind(category_id)
        .bind(seed.severity.as_str())
        .bind(seed.frequency.as_str())
        .bind(seed.budget_min)
        .bind(seed.budget_max)
        .bind(seed.estimated_duration_days)
        .bind(serde_json::json!(seed.stakeholders))
        .bind(serde_json::json!(seed.tasks))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_signals(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    for signal in SIGNAL_DEFINITIONS {
        sqlx::query(
            "INSERT INTO trigger_signals (category, name, unit, default_threshold, default_condition)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(signal.category)
        .bind(signal.name)
        .bind(signal.unit)
        .bind(signal.default_threshold)
        .bind(signal.default_condition.as_str())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Link each signal to the most severe template playbooks in its domain.
async fn link_signals(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    let library = derive_library();
    let playbook_ids: HashMap<String, DbId> = sqlx::query_as::<_, (String, DbId)>(
        "SELECT name, id FROM playbook_library WHERE is_template",
    )
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .collect();
    let signals: Vec<(DbId, String)> = sqlx::query_as("SELECT id, category FROM trigger_signals")
        .fetch_all(&mut *conn)
        .await?;

    for (signal_id, category) in signals {
        for (index, relevance) in rank_for_domain(&library, &category) {
            let Some(&playbook_id) = playbook_ids.get(library[index].name) else {
                continue;
            };
            sqlx::query(
                "INSERT INTO signal_playbook_links (signal_id, playbook_id, relevance)
                 VALUES ($1, $2, $3)
                 ON CONFLICT DO NOTHING",
            )
            .bind(signal_id)
            .bind(playbook_id)
            .bind(relevance)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}
