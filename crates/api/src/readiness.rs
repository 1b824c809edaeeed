//! Startup readiness: whether the content library has been seeded.
//!
//! Seeding runs in a background task after the listener is bound, so health
//! checks report `starting` (503) until it settles.

use bastion_db::seed::SeedReport;
use tokio::sync::RwLock;

/// Outcome of the startup seed.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedState {
    Pending,
    Ready(SeedReport),
    Failed(String),
}

impl SeedState {
    pub fn label(&self) -> &'static str {
        match self {
            SeedState::Pending => "pending",
            SeedState::Ready(_) => "ready",
            SeedState::Failed(_) => "failed",
        }
    }
}

/// Shared, lock-protected [`SeedState`].
#[derive(Debug)]
pub struct Readiness {
    state: RwLock<SeedState>,
}

impl Readiness {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SeedState::Pending),
        }
    }

    pub async fn mark_ready(&self, report: SeedReport) {
        *self.state.write().await = SeedState::Ready(report);
    }

    pub async fn mark_failed(&self, error: impl Into<String>) {
        *self.state.write().await = SeedState::Failed(error.into());
    }

    pub async fn current(&self) -> SeedState {
        self.state.read().await.clone()
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}
