//! End-to-end socket tests against a served router on a loopback port.

mod common;

use std::sync::Arc;
use std::time::Duration;

use bastion_api::notifications::ChangeNotifier;
use bastion_core::collaboration::ServerMessage;
use futures::{SinkExt, StreamExt};
use sqlx::PgPool;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serve the app on an ephemeral port and return its address.
async fn serve(pool: PgPool) -> String {
    let state = common::build_test_state(pool).await;
    tokio::spawn(
        ChangeNotifier::new(Arc::clone(&state.collab)).run(state.event_bus.subscribe()),
    );
    let app = common::app_with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr.to_string()
}

/// Next server frame, skipping transport-level pings.
async fn next_frame(socket: &mut Socket) -> ServerMessage {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("frame within timeout")
            .expect("socket open")
            .expect("valid frame");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn send(socket: &mut Socket, frame: serde_json::Value) {
    socket
        .send(Message::Text(frame.to_string().into()))
        .await
        .unwrap();
}

async fn open(addr: &str) -> Socket {
    let (mut socket, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    match next_frame(&mut socket).await {
        ServerMessage::Connected { connection_id } => assert!(!connection_id.is_empty()),
        other => panic!("expected connected, got {other:?}"),
    }
    socket
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn socket_round_trip_and_room_broadcast(pool: PgPool) {
    let addr = serve(pool).await;
    let mut alice = open(&addr).await;
    let mut bob = open(&addr).await;

    send(&mut alice, serde_json::json!({ "type": "ping" })).await;
    assert!(matches!(next_frame(&mut alice).await, ServerMessage::Pong { .. }));

    send(
        &mut alice,
        serde_json::json!({ "type": "authenticate", "userId": "alice", "userName": "Alice" }),
    )
    .await;
    assert!(matches!(
        next_frame(&mut alice).await,
        ServerMessage::Authenticated { .. }
    ));

    send(
        &mut alice,
        serde_json::json!({ "type": "create_room", "name": "Market entry" }),
    )
    .await;
    let room_id = match next_frame(&mut bob).await {
        ServerMessage::RoomCreated { room } => {
            assert_eq!(room.name, "Market entry");
            room.id
        }
        other => panic!("expected room_created, got {other:?}"),
    };
    assert!(matches!(
        next_frame(&mut alice).await,
        ServerMessage::RoomCreated { .. }
    ));

    send(
        &mut bob,
        serde_json::json!({ "type": "join_room", "roomId": room_id, "userId": "bob" }),
    )
    .await;
    assert!(matches!(next_frame(&mut bob).await, ServerMessage::RoomUpdate { .. }));
    match next_frame(&mut alice).await {
        ServerMessage::UserJoined {
            user,
            participant_count,
            ..
        } => {
            assert_eq!(user.user_id, "bob");
            assert_eq!(participant_count, 2);
        }
        other => panic!("expected user_joined, got {other:?}"),
    }

    // Dropping bob's socket removes him from the room.
    bob.close(None).await.unwrap();
    match next_frame(&mut alice).await {
        ServerMessage::UserLeft { user_id, .. } => assert_eq!(user_id, "bob"),
        other => panic!("expected user_left, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rest_mutations_reach_sockets_as_entity_changed(pool: PgPool) {
    let addr = serve(pool).await;
    let mut socket = open(&addr).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/organizations"))
        .json(&serde_json::json!({ "name": "Acme" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let created: serde_json::Value = response.json().await.unwrap();

    match next_frame(&mut socket).await {
        ServerMessage::EntityChanged {
            entity, action, id, ..
        } => {
            assert_eq!(entity, "organization");
            assert_eq!(action, "created");
            assert_eq!(
                id.map(|id| id.to_string()).as_deref(),
                created["id"].as_str()
            );
        }
        other => panic!("expected entity_changed, got {other:?}"),
    }
}
