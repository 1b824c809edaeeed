use std::sync::Arc;

use bastion_events::EventBus;

use crate::briefing::BriefingWriter;
use crate::config::ServerConfig;
use crate::readiness::Readiness;
use crate::ws::CollaborationService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bastion_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Socket registry and decision rooms.
    pub collab: Arc<CollaborationService>,
    /// In-process change notifications.
    pub event_bus: Arc<EventBus>,
    /// Startup seed outcome, reported by the health endpoints.
    pub readiness: Arc<Readiness>,
    pub briefing_writer: Arc<BriefingWriter>,
}

impl AppState {
    /// Build state with fresh in-memory services around an existing pool.
    pub fn new(pool: bastion_db::DbPool, config: ServerConfig) -> Self {
        let briefing_writer = BriefingWriter::from_config(&config);
        Self {
            pool,
            config: Arc::new(config),
            collab: Arc::new(CollaborationService::new()),
            event_bus: Arc::new(EventBus::default()),
            readiness: Arc::new(Readiness::new()),
            briefing_writer: Arc::new(briefing_writer),
        }
    }
}
