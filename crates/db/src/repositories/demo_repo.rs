//! Bulk removal of tenant data for demo resets.

use serde::Serialize;
use sqlx::PgPool;

/// Rows removed by [`DemoRepo::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetCounts {
    pub organizations: u64,
    pub activity_logs: u64,
}

pub struct DemoRepo;

impl DemoRepo {
    /// Delete every organization (cascading to users, scenarios, tasks,
    /// triggers, alerts, sessions, briefings and reports) and the whole
    /// activity log, in one transaction.
    ///
    /// The seeded library, signals and their links are untouched.
    pub async fn reset(pool: &PgPool) -> Result<ResetCounts, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let organizations = sqlx::query("DELETE FROM organizations")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let activity_logs = sqlx::query("DELETE FROM activity_logs")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(ResetCounts {
            organizations,
            activity_logs,
        })
    }
}
