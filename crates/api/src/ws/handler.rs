use std::ops::ControlFlow;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use bastion_core::collaboration::ServerMessage;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::state::AppState;
use crate::ws::collaboration::CollaborationService;

/// GET /ws -- upgrade to the collaboration socket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.collab))
}

/// Drive one collaboration socket from `connected` to disconnect.
///
/// Outbound frames come from the registry channel and are pumped on a
/// spawned task; inbound frames are dispatched here until the peer closes.
/// On exit the connection leaves every room it joined.
async fn handle_socket(socket: WebSocket, collab: Arc<CollaborationService>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let outbound = collab.connect(&conn_id).await;
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let (sink, mut stream) = socket.split();
    let pump = tokio::spawn(pump_outbound(conn_id.clone(), outbound, sink));

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        };
        if dispatch(&collab, &conn_id, frame).await.is_break() {
            break;
        }
    }

    collab.disconnect(&conn_id).await;
    pump.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

async fn dispatch(
    collab: &CollaborationService,
    conn_id: &str,
    frame: Message,
) -> ControlFlow<()> {
    match frame {
        Message::Text(text) => collab.handle_text(conn_id, text.as_str()).await,
        Message::Binary(_) => {
            let reply = ServerMessage::error("Invalid message: binary frames are not supported");
            collab.connections().send_to(conn_id, &reply).await;
        }
        Message::Close(_) => return ControlFlow::Break(()),
        Message::Pong(_) => tracing::trace!(conn_id = %conn_id, "Pong received"),
        // axum answers pings itself.
        Message::Ping(_) => {}
    }
    ControlFlow::Continue(())
}

async fn pump_outbound(
    conn_id: String,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    mut sink: SplitSink<WebSocket, Message>,
) {
    while let Some(frame) = outbound.recv().await {
        if sink.send(frame).await.is_err() {
            tracing::debug!(conn_id = %conn_id, "WebSocket sink closed");
            break;
        }
    }
}
