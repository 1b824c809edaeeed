//! Repository for `trigger_signals` and `signal_playbook_links`.

use bastion_core::types::DbId;
use sqlx::PgPool;

use crate::models::signal::{SignalFilter, SignalPlaybook, TriggerSignal};

const COLUMNS: &str =
    "id, category, name, unit, default_threshold, default_condition, created_at";

/// Read access to the seeded signal catalogue.
pub struct SignalRepo;

impl SignalRepo {
    /// List signals, grouped by category then name.
    pub async fn list(
        pool: &PgPool,
        filter: &SignalFilter,
    ) -> Result<Vec<TriggerSignal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM trigger_signals
             WHERE ($1::TEXT IS NULL OR category = $1)
             ORDER BY category ASC, name ASC"
        );
        sqlx::query_as::<_, TriggerSignal>(&query)
            .bind(filter.category.as_deref())
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TriggerSignal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trigger_signals WHERE id = $1");
        sqlx::query_as::<_, TriggerSignal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Playbooks linked to a signal, most relevant first.
    pub async fn playbooks_for(
        pool: &PgPool,
        signal_id: DbId,
    ) -> Result<Vec<SignalPlaybook>, sqlx::Error> {
        sqlx::query_as::<_, SignalPlaybook>(
            "SELECT p.id AS playbook_id, p.name, d.slug AS domain, c.slug AS category,
                    p.severity, l.relevance
             FROM signal_playbook_links l
             JOIN playbook_library p ON p.id = l.playbook_id
             JOIN playbook_domains d ON d.id = p.domain_id
             JOIN playbook_categories c ON c.id = p.category_id
             WHERE l.signal_id = $1
             ORDER BY l.relevance DESC, p.name ASC",
        )
        .bind(signal_id)
        .fetch_all(pool)
        .await
    }

    /// Ids of the playbooks linked to a signal, most relevant first.
    pub async fn playbook_ids_for(
        pool: &PgPool,
        signal_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT playbook_id FROM signal_playbook_links
             WHERE signal_id = $1
             ORDER BY relevance DESC",
        )
        .bind(signal_id)
        .fetch_all(pool)
        .await
    }

    /// Look up a signal id by its unique name.
    pub async fn find_id_by_name(pool: &PgPool, name: &str) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM trigger_signals WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
