//! Repository for the `board_reports` table.

use bastion_core::types::DbId;
use sqlx::PgPool;

use crate::models::board_report::{
    BoardReport, BoardReportFilter, CreateBoardReport, UpdateBoardReport,
};

const COLUMNS: &str =
    "id, organization_id, title, period, content, status, created_at, updated_at";

/// Provides CRUD operations for board reports.
pub struct BoardReportRepo;

impl BoardReportRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateBoardReport,
    ) -> Result<BoardReport, sqlx::Error> {
        let query = format!(
            "INSERT INTO board_reports (organization_id, title, period, content, status)
             VALUES ($1, $2, $3, COALESCE($4, ''), COALESCE($5, 'draft'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoardReport>(&query)
            .bind(input.organization_id)
            .bind(input.title.trim())
            .bind(&input.period)
            .bind(&input.content)
            .bind(input.status.map(|s| s.as_str()))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BoardReport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM board_reports WHERE id = $1");
        sqlx::query_as::<_, BoardReport>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        filter: &BoardReportFilter,
    ) -> Result<Vec<BoardReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM board_reports
             WHERE ($1::UUID IS NULL OR organization_id = $1)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, BoardReport>(&query)
            .bind(filter.organization_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBoardReport,
    ) -> Result<Option<BoardReport>, sqlx::Error> {
        let query = format!(
            "UPDATE board_reports SET
                title = COALESCE($2, title),
                period = COALESCE($3, period),
                content = COALESCE($4, content),
                status = COALESCE($5, status),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BoardReport>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.period)
            .bind(&input.content)
            .bind(input.status.map(|s| s.as_str()))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM board_reports WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
