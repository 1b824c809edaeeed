//! Activity-log persistence service.
//!
//! [`ActivityPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and appends every received [`ChangeEvent`] to `activity_logs`. It runs as
//! a long-lived background task and exits when the bus is dropped.

use bastion_core::activity::redact_sensitive_fields;
use bastion_db::models::activity::{ActivityLog, CreateActivityLog};
use bastion_db::repositories::ActivityRepo;
use bastion_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::ChangeEvent;

/// Background service that records change events.
pub struct ActivityPersistence;

impl ActivityPersistence {
    /// Run the persistence loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<ChangeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            entity = %event.entity,
                            action = %event.action,
                            "Failed to record activity"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Activity persistence lagged, events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, activity persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event, redacting sensitive keys in `details`.
    pub async fn persist(pool: &DbPool, event: &ChangeEvent) -> Result<ActivityLog, sqlx::Error> {
        let entry = CreateActivityLog {
            organization_id: event.organization_id,
            entity_type: event.entity.clone(),
            entity_id: event.entity_id,
            action: event.action.clone(),
            actor: event.actor.clone(),
            details: redact_sensitive_fields(&event.details),
        };
        ActivityRepo::insert(pool, &entry).await
    }
}
