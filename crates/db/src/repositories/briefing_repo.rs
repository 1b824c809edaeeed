//! Repository for the `executive_briefings` table.

use bastion_core::types::DbId;
use sqlx::PgPool;

use crate::models::briefing::{Briefing, BriefingFilter, CreateBriefing, UpdateBriefing};

const COLUMNS: &str =
    "id, organization_id, title, summary, content, status, generated, created_at, updated_at";

/// Provides CRUD operations for executive briefings.
pub struct BriefingRepo;

impl BriefingRepo {
    /// Insert a briefing. Status defaults to `draft`.
    pub async fn create(pool: &PgPool, input: &CreateBriefing) -> Result<Briefing, sqlx::Error> {
        let query = format!(
            "INSERT INTO executive_briefings (organization_id, title, summary, content, status, generated)
             VALUES ($1, $2, $3, COALESCE($4, ''), COALESCE($5, 'draft'), $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Briefing>(&query)
            .bind(input.organization_id)
            .bind(input.title.trim())
            .bind(&input.summary)
            .bind(&input.content)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.generated)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Briefing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM executive_briefings WHERE id = $1");
        sqlx::query_as::<_, Briefing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List briefings, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &BriefingFilter,
    ) -> Result<Vec<Briefing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM executive_briefings
             WHERE ($1::UUID IS NULL OR organization_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Briefing>(&query)
            .bind(filter.organization_id)
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBriefing,
    ) -> Result<Option<Briefing>, sqlx::Error> {
        let query = format!(
            "UPDATE executive_briefings SET
                title = COALESCE($2, title),
                summary = COALESCE($3, summary),
                content = COALESCE($4, content),
                status = COALESCE($5, status),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Briefing>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.summary)
            .bind(&input.content)
            .bind(input.status.map(|s| s.as_str()))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM executive_briefings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
