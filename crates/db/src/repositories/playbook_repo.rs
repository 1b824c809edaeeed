//! Repositories for the playbook library and its lookup tables.

use bastion_core::pagination::{clamp_limit, clamp_offset, MAX_LIMIT};
use bastion_core::types::DbId;
use sqlx::PgPool;

use crate::models::playbook::{
    CountByKey, CreatePlaybook, Playbook, PlaybookFilter, PlaybookGroup, PlaybookStats,
    UpdatePlaybook,
};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Select list for a playbook joined to its domain and category.
const COLUMNS: &str = "\
    p.id, p.name, p.description, p.domain_id, d.slug AS domain, \
    p.category_id, c.slug AS category, p.severity, p.frequency, \
    p.budget_min, p.budget_max, p.estimated_duration_days, \
    p.stakeholders, p.tasks, p.is_template, p.created_at, p.updated_at";

const FROM_JOINED: &str = "\
    playbook_library p \
    JOIN playbook_domains d ON d.id = p.domain_id \
    JOIN playbook_categories c ON c.id = p.category_id";

/// Shared WHERE clause for list and count; binds `$1..$4`.
const FILTER: &str = "\
    ($1::TEXT IS NULL OR d.slug = $1) \
    AND ($2::TEXT IS NULL OR c.slug = $2) \
    AND ($3::TEXT IS NULL OR p.severity = $3) \
    AND ($4::TEXT IS NULL OR p.name ILIKE '%' || $4 || '%' OR p.description ILIKE '%' || $4 || '%')";

// ---------------------------------------------------------------------------
// PlaybookRepo
// ---------------------------------------------------------------------------

/// Provides CRUD, search and aggregate queries for `playbook_library`.
pub struct PlaybookRepo;

impl PlaybookRepo {
    /// Insert a custom (non-template) playbook.
    ///
    /// The caller resolves the domain and category slugs to ids first.
    pub async fn create(
        pool: &PgPool,
        domain_id: DbId,
        category_id: DbId,
        input: &CreatePlaybook,
    ) -> Result<Playbook, sqlx::Error> {
        let stakeholders = serde_json::json!(input.stakeholders.clone().unwrap_or_default());
        let tasks = serde_json::json!(input.tasks.clone().unwrap_or_default());
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO playbook_library
                (name, description, domain_id, category_id, severity, frequency,
                 budget_min, budget_max, estimated_duration_days, stakeholders, tasks)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'medium'), COALESCE($6, 'occasional'),
                     $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(domain_id)
        .bind(category_id)
        .bind(input.severity.map(|s| s.as_str()))
        .bind(input.frequency.map(|f| f.as_str()))
        .bind(input.budget_min)
        .bind(input.budget_max)
        .bind(input.estimated_duration_days)
        .bind(stakeholders)
        .bind(tasks)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Playbook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM_JOINED} WHERE p.id = $1");
        sqlx::query_as::<_, Playbook>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Search the library. Results are ordered by category, domain, then name.
    ///
    /// Without an explicit `limit` the whole library fits in one page.
    pub async fn list(
        pool: &PgPool,
        filter: &PlaybookFilter,
    ) -> Result<Vec<Playbook>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM_JOINED}
             WHERE {FILTER}
             ORDER BY c.slug ASC, d.slug ASC, p.name ASC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Playbook>(&query)
            .bind(filter.domain.as_deref())
            .bind(filter.category.map(|c| c.as_str()))
            .bind(filter.severity.map(|s| s.as_str()))
            .bind(search_term(filter))
            .bind(clamp_limit(filter.limit, MAX_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// Count rows matching the filter, ignoring pagination.
    pub async fn count(pool: &PgPool, filter: &PlaybookFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM {FROM_JOINED} WHERE {FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.domain.as_deref())
            .bind(filter.category.map(|c| c.as_str()))
            .bind(filter.severity.map(|s| s.as_str()))
            .bind(search_term(filter))
            .fetch_one(pool)
            .await
    }

    /// Update a playbook. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        domain_id: Option<DbId>,
        category_id: Option<DbId>,
        input: &UpdatePlaybook,
    ) -> Result<Option<Playbook>, sqlx::Error> {
        let stakeholders = input.stakeholders.as_ref().map(|s| serde_json::json!(s));
        let tasks = input.tasks.as_ref().map(|t| serde_json::json!(t));
        let updated = sqlx::query(
            "UPDATE playbook_library SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                domain_id = COALESCE($4, domain_id),
                category_id = COALESCE($5, category_id),
                severity = COALESCE($6, severity),
                frequency = COALESCE($7, frequency),
                budget_min = COALESCE($8, budget_min),
                budget_max = COALESCE($9, budget_max),
                estimated_duration_days = COALESCE($10, estimated_duration_days),
                stakeholders = COALESCE($11, stakeholders),
                tasks = COALESCE($12, tasks),
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(domain_id)
        .bind(category_id)
        .bind(input.severity.map(|s| s.as_str()))
        .bind(input.frequency.map(|f| f.as_str()))
        .bind(input.budget_min)
        .bind(input.budget_max)
        .bind(input.estimated_duration_days)
        .bind(stakeholders)
        .bind(tasks)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Delete a playbook. Scenarios created from it keep a `NULL` link.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM playbook_library WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch several playbooks by id, preserving no particular order.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Playbook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM_JOINED} WHERE p.id = ANY($1)");
        sqlx::query_as::<_, Playbook>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Totals grouped by category, domain and severity.
    pub async fn stats(pool: &PgPool) -> Result<PlaybookStats, sqlx::Error> {
        let (total, templates): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*)::BIGINT, COUNT(*) FILTER (WHERE is_template)::BIGINT
             FROM playbook_library",
        )
        .fetch_one(pool)
        .await?;

        let by_category = grouped(pool, "c.slug").await?;
        let by_domain = grouped(pool, "d.slug").await?;
        let by_severity = grouped(pool, "p.severity").await?;

        Ok(PlaybookStats {
            total,
            templates,
            by_category,
            by_domain,
            by_severity,
        })
    }
}

fn search_term(filter: &PlaybookFilter) -> Option<&str> {
    filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Count playbooks grouped by `key_expr`, which must be one of the fixed
/// column expressions above (never user input).
async fn grouped(pool: &PgPool, key_expr: &str) -> Result<Vec<CountByKey>, sqlx::Error> {
    let query = format!(
        "SELECT {key_expr} AS key, COUNT(*)::BIGINT AS count
         FROM {FROM_JOINED}
         GROUP BY {key_expr}
         ORDER BY {key_expr} ASC"
    );
    sqlx::query_as::<_, CountByKey>(&query).fetch_all(pool).await
}

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

/// Read access to `playbook_domains`.
pub struct PlaybookDomainRepo;

impl PlaybookDomainRepo {
    /// All domains with the number of playbooks in each, by slug.
    pub async fn list(pool: &PgPool) -> Result<Vec<PlaybookGroup>, sqlx::Error> {
        sqlx::query_as::<_, PlaybookGroup>(
            "SELECT d.id, d.slug, d.name, d.description, COUNT(p.id)::BIGINT AS playbook_count
             FROM playbook_domains d
             LEFT JOIN playbook_library p ON p.domain_id = d.id
             GROUP BY d.id
             ORDER BY d.slug ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_id_by_slug(pool: &PgPool, slug: &str) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM playbook_domains WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
    }
}

/// Read access to `playbook_categories`.
pub struct PlaybookCategoryRepo;

impl PlaybookCategoryRepo {
    /// All categories with the number of playbooks in each.
    pub async fn list(pool: &PgPool) -> Result<Vec<PlaybookGroup>, sqlx::Error> {
        sqlx::query_as::<_, PlaybookGroup>(
            "SELECT c.id, c.slug, c.name, c.description, COUNT(p.id)::BIGINT AS playbook_count
             FROM playbook_categories c
             LEFT JOIN playbook_library p ON p.category_id = c.id
             GROUP BY c.id
             ORDER BY c.slug ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_id_by_slug(pool: &PgPool, slug: &str) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM playbook_categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
    }
}
