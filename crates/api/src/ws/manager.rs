use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use bastion_core::collaboration::{Participant, ServerMessage};
use bastion_core::types::Timestamp;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Identity announced via `authenticate` or `join_room`, if any.
    pub participant: Option<Participant>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

#[derive(Default)]
struct Inner {
    connections: HashMap<String, WsConnection>,
    /// `user_id -> conn_id` of the user's most recently identified socket.
    users: HashMap<String, String>,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; shared through the
/// [`CollaborationService`](super::CollaborationService) that owns it.
pub struct WsManager {
    inner: RwLock<Inner>,
}

/// Serialize a server frame into a text message.
pub fn encode(message: &ServerMessage) -> Message {
    match serde_json::to_string(message) {
        Ok(text) => Message::Text(text.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize server message");
            Message::Text(r#"{"type":"error","message":"Internal error"}"#.into())
        }
    }
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            participant: None,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.inner.write().await.connections.insert(conn_id, conn);
        rx
    }

    /// Remove a connection, returning the identity it carried.
    pub async fn remove(&self, conn_id: &str) -> Option<Participant> {
        let mut inner = self.inner.write().await;
        let conn = inner.connections.remove(conn_id)?;
        if let Some(participant) = &conn.participant {
            if inner.users.get(&participant.user_id).map(String::as_str) == Some(conn_id) {
                inner.users.remove(&participant.user_id);
            }
        }
        conn.participant
    }

    /// Attach an identity to a connection. Returns `false` for an unknown id.
    pub async fn identify(&self, conn_id: &str, participant: Participant) -> bool {
        let mut inner = self.inner.write().await;
        let Some(conn) = inner.connections.get_mut(conn_id) else {
            return false;
        };
        let user_id = participant.user_id.clone();
        conn.participant = Some(participant);
        inner.users.insert(user_id, conn_id.to_string());
        true
    }

    pub async fn participant(&self, conn_id: &str) -> Option<Participant> {
        self.inner
            .read()
            .await
            .connections
            .get(conn_id)
            .and_then(|c| c.participant.clone())
    }

    /// Connection currently associated with a user.
    pub async fn conn_for_user(&self, user_id: &str) -> Option<String> {
        self.inner.read().await.users.get(user_id).cloned()
    }

    /// Send a frame to one connection. Returns `false` if it is gone.
    pub async fn send_to(&self, conn_id: &str, message: &ServerMessage) -> bool {
        let inner = self.inner.read().await;
        match inner.connections.get(conn_id) {
            Some(conn) => conn.sender.send(encode(message)).is_ok(),
            None => false,
        }
    }

    /// Send a frame to each listed connection, skipping unknown ids.
    pub async fn send_to_many<'a, I>(&self, conn_ids: I, message: &ServerMessage)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let encoded = encode(message);
        let inner = self.inner.read().await;
        for id in conn_ids {
            if let Some(conn) = inner.connections.get(id) {
                let _ = conn.sender.send(encoded.clone());
            }
        }
    }

    /// Send a frame to the socket a user last identified on.
    pub async fn send_to_user(&self, user_id: &str, message: &ServerMessage) -> bool {
        let inner = self.inner.read().await;
        inner
            .users
            .get(user_id)
            .and_then(|conn_id| inner.connections.get(conn_id))
            .is_some_and(|conn| conn.sender.send(encode(message)).is_ok())
    }

    /// Broadcast a frame to all connected clients.
    ///
    /// Connections whose send channels are closed are silently skipped
    /// (they are cleaned up when their receive loop ends).
    pub async fn broadcast(&self, message: &ServerMessage) {
        let encoded = encode(message);
        let inner = self.inner.read().await;
        for conn in inner.connections.values() {
            let _ = conn.sender.send(encoded.clone());
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut inner = self.inner.write().await;
        let count = inner.connections.len();
        for conn in inner.connections.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        inner.connections.clear();
        inner.users.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let inner = self.inner.read().await;
        for conn in inner.connections.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
