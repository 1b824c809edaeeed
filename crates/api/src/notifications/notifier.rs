//! [`ChangeNotifier`] subscribes to the event bus and pushes an
//! `entity_changed` frame to every connected socket, telling clients to
//! refetch the affected resource.

use std::sync::Arc;

use bastion_core::collaboration::ServerMessage;
use bastion_events::ChangeEvent;
use tokio::sync::broadcast;

use crate::ws::CollaborationService;

pub struct ChangeNotifier {
    collab: Arc<CollaborationService>,
}

impl ChangeNotifier {
    pub fn new(collab: Arc<CollaborationService>) -> Self {
        Self { collab }
    }

    /// Run the notification loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](bastion_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<ChangeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.collab.notify_all(&frame_for(&event)).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Change notifier lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, change notifier shutting down");
                    break;
                }
            }
        }
    }
}

/// The `entity_changed` frame for an event.
pub fn frame_for(event: &ChangeEvent) -> ServerMessage {
    ServerMessage::EntityChanged {
        entity: event.entity.clone(),
        action: event.action.clone(),
        id: event.entity_id,
        organization_id: event.organization_id,
    }
}
