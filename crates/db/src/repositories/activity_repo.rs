//! Repository for the append-only `activity_logs` table.

use bastion_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use bastion_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{ActivityFilter, ActivityLog, CreateActivityLog};

const COLUMNS: &str =
    "id, organization_id, entity_type, entity_id, action, actor, details, created_at";

/// Shared WHERE clause for query and count; binds `$1..$3`.
const FILTER: &str = "\
    ($1::UUID IS NULL OR organization_id = $1) \
    AND ($2::TEXT IS NULL OR entity_type = $2) \
    AND ($3::TEXT IS NULL OR action = $3)";

/// Insert and query operations for the activity log.
pub struct ActivityRepo;

impl ActivityRepo {
    pub async fn insert(
        pool: &PgPool,
        entry: &CreateActivityLog,
    ) -> Result<ActivityLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO activity_logs (organization_id, entity_type, entity_id, action, actor, details)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(entry.organization_id)
            .bind(&entry.entity_type)
            .bind(entry.entity_id)
            .bind(&entry.action)
            .bind(&entry.actor)
            .bind(&entry.details)
            .fetch_one(pool)
            .await
    }

    /// Newest-first page of entries matching the filter.
    pub async fn query(
        pool: &PgPool,
        filter: &ActivityFilter,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_logs
             WHERE {FILTER}
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, ActivityLog>(&query)
            .bind(filter.organization_id)
            .bind(filter.entity_type.as_deref())
            .bind(filter.action.as_deref())
            .bind(clamp_limit(filter.limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// Count entries matching the filter (for pagination metadata).
    pub async fn count(pool: &PgPool, filter: &ActivityFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM activity_logs WHERE {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.organization_id)
            .bind(filter.entity_type.as_deref())
            .bind(filter.action.as_deref())
            .fetch_one(pool)
            .await
    }

    /// The most recent `limit` entries for one organization.
    pub async fn recent_for_organization(
        pool: &PgPool,
        organization_id: DbId,
        limit: i64,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let filter = ActivityFilter {
            organization_id: Some(organization_id),
            limit: Some(limit),
            ..Default::default()
        };
        Self::query(pool, &filter).await
    }
}
