//! Tests for `CollaborationService`.
//!
//! Frames are fed straight into the service and the outbound channels are
//! drained, so no HTTP upgrade or database is involved.

use assert_matches::assert_matches;
use axum::extract::ws::Message;
use bastion_api::ws::CollaborationService;
use bastion_core::collaboration::{RoomPhase, ServerMessage};
use tokio::sync::mpsc::UnboundedReceiver;

/// Every frame currently queued for a connection, decoded.
fn drain(rx: &mut UnboundedReceiver<Message>) -> Vec<ServerMessage> {
    let mut frames = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let Message::Text(text) = message {
            frames.push(serde_json::from_str(text.as_str()).expect("server frame is valid JSON"));
        }
    }
    frames
}

fn only(rx: &mut UnboundedReceiver<Message>) -> ServerMessage {
    let mut frames = drain(rx);
    assert_eq!(frames.len(), 1, "expected exactly one frame, got {frames:?}");
    frames.remove(0)
}

fn error_text(frame: ServerMessage) -> String {
    match frame {
        ServerMessage::Error { message } => message,
        other => panic!("expected an error frame, got {other:?}"),
    }
}

async fn join(service: &CollaborationService, conn: &str, room: &str, user: &str) {
    service
        .handle_text(
            conn,
            &format!(r#"{{"type":"join_room","roomId":"{room}","userId":"{user}"}}"#),
        )
        .await;
}

/// Two members, alice on `conn-a` and bob on `conn-b`, in a fresh room.
async fn room_with_two_members(
    service: &CollaborationService,
) -> (String, UnboundedReceiver<Message>, UnboundedReceiver<Message>) {
    let mut a = service.connect("conn-a").await;
    let mut b = service.connect("conn-b").await;
    let room = service
        .open_room(None, "Liquidity crunch", None)
        .await
        .unwrap();

    join(service, "conn-a", &room.id, "alice").await;
    join(service, "conn-b", &room.id, "bob").await;
    drain(&mut a);
    drain(&mut b);
    (room.id, a, b)
}

// ---------------------------------------------------------------------------
// Connection lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn connect_greets_with_connection_id() {
    let service = CollaborationService::new();
    let mut rx = service.connect("conn-1").await;

    assert_matches!(
        only(&mut rx),
        ServerMessage::Connected { connection_id } if connection_id == "conn-1"
    );
    assert_eq!(service.connections().connection_count().await, 1);
}

#[tokio::test]
async fn malformed_frame_gets_error_and_connection_stays() {
    let service = CollaborationService::new();
    let mut rx = service.connect("conn-1").await;
    drain(&mut rx);

    service.handle_text("conn-1", "not json").await;
    assert!(error_text(only(&mut rx)).starts_with("Invalid message:"));

    service.handle_text("conn-1", r#"{"type":"ping"}"#).await;
    assert_matches!(only(&mut rx), ServerMessage::Pong { .. });
}

#[tokio::test]
async fn actions_require_an_identity() {
    let service = CollaborationService::new();
    let mut rx = service.connect("conn-1").await;
    drain(&mut rx);

    service
        .handle_text("conn-1", r#"{"type":"create_room","name":"Pricing"}"#)
        .await;
    assert_eq!(error_text(only(&mut rx)), "Not authenticated");

    service
        .handle_text("conn-1", r#"{"type":"authenticate","userId":"alice","userName":"Alice"}"#)
        .await;
    assert_matches!(
        only(&mut rx),
        ServerMessage::Authenticated { user_id } if user_id == "alice"
    );
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn room_creation_is_announced_to_everyone() {
    let service = CollaborationService::new();
    let mut a = service.connect("conn-a").await;
    let mut b = service.connect("conn-b").await;
    drain(&mut a);
    drain(&mut b);

    service
        .handle_text("conn-a", r#"{"type":"authenticate","userId":"alice"}"#)
        .await;
    drain(&mut a);
    service
        .handle_text("conn-a", r#"{"type":"create_room","name":"Pricing war"}"#)
        .await;

    let created = assert_matches!(only(&mut a), ServerMessage::RoomCreated { room } => room);
    assert_eq!(created.name, "Pricing war");
    assert_eq!(created.participants.len(), 1);
    assert_eq!(created.participants[0].user_name, "alice");
    assert_matches!(only(&mut b), ServerMessage::RoomCreated { room } if room.id == created.id);
}

#[tokio::test]
async fn joining_notifies_existing_members() {
    let service = CollaborationService::new();
    let mut a = service.connect("conn-a").await;
    let mut b = service.connect("conn-b").await;
    let room = service.open_room(None, "Board prep", None).await.unwrap();
    drain(&mut a);
    drain(&mut b);

    join(&service, "conn-a", &room.id, "alice").await;
    assert_matches!(only(&mut a), ServerMessage::RoomUpdate { room } if room.participants.len() == 1);
    assert!(drain(&mut b).is_empty());

    join(&service, "conn-b", &room.id, "bob").await;
    assert_matches!(only(&mut b), ServerMessage::RoomUpdate { room } if room.participants.len() == 2);
    assert_matches!(
        only(&mut a),
        ServerMessage::UserJoined { user, participant_count: 2, .. } if user.user_id == "bob"
    );
}

#[tokio::test]
async fn joining_a_missing_room_is_rejected() {
    let service = CollaborationService::new();
    let mut rx = service.connect("conn-1").await;
    drain(&mut rx);

    join(&service, "conn-1", "no-such-room", "alice").await;
    assert_eq!(error_text(only(&mut rx)), "Room not found");
}

#[tokio::test]
async fn votes_fan_out_and_replace_earlier_votes() {
    let service = CollaborationService::new();
    let (room, mut a, mut b) = room_with_two_members(&service).await;

    service
        .handle_text(
            "conn-a",
            &format!(
                r#"{{"type":"create_decision","roomId":"{room}","title":"Bridge financing","options":["Revolver","Equity raise"]}}"#
            ),
        )
        .await;
    assert_matches!(only(&mut a), ServerMessage::RoomUpdate { .. });
    let decision = assert_matches!(
        only(&mut b),
        ServerMessage::DecisionCreated { decision, .. } => decision
    );
    assert_eq!(decision.options.len(), 2);
    assert_eq!(decision.created_by, "alice");

    let vote = |option: &str| {
        format!(
            r#"{{"type":"cast_vote","roomId":"{room}","decisionId":"{}","optionId":"{option}","confidence":80}}"#,
            decision.id
        )
    };

    service.handle_text("conn-b", &vote("option-1")).await;
    assert_matches!(
        only(&mut b),
        ServerMessage::VoteRecorded { option_id, total_votes: 1, .. } if option_id == "option-1"
    );
    let options = assert_matches!(
        only(&mut a),
        ServerMessage::VoteCast { user_id, options, total_votes: 1, .. } if user_id == "bob" => options
    );
    assert_eq!(options[0].support_count, 1);

    // Changing the vote moves support instead of adding a second vote.
    service.handle_text("conn-b", &vote("option-2")).await;
    drain(&mut b);
    let options = assert_matches!(
        only(&mut a),
        ServerMessage::VoteCast { options, total_votes: 1, .. } => options
    );
    assert_eq!(options[0].support_count, 0);
    assert_eq!(options[1].support_count, 1);

    service.handle_text("conn-b", &vote("option-9")).await;
    assert_eq!(error_text(only(&mut b)), "Option not found for this decision");
    assert!(drain(&mut a).is_empty());
}

#[tokio::test]
async fn concluded_room_rejects_votes() {
    let service = CollaborationService::new();
    let (room, mut a, mut b) = room_with_two_members(&service).await;

    service
        .handle_text(
            "conn-a",
            &format!(
                r#"{{"type":"create_decision","roomId":"{room}","title":"Go or no-go","options":["Go","No-go"]}}"#
            ),
        )
        .await;
    drain(&mut a);
    let decision = assert_matches!(
        only(&mut b),
        ServerMessage::DecisionCreated { decision, .. } => decision
    );

    service
        .handle_text(
            "conn-a",
            &format!(r#"{{"type":"change_phase","roomId":"{room}","phase":"concluded"}}"#),
        )
        .await;
    assert_matches!(only(&mut a), ServerMessage::RoomUpdate { room } if room.phase == RoomPhase::Concluded);
    assert_matches!(
        only(&mut b),
        ServerMessage::PhaseChanged { phase: RoomPhase::Concluded, changed_by, .. } if changed_by == "alice"
    );

    service
        .handle_text(
            "conn-b",
            &format!(
                r#"{{"type":"cast_vote","roomId":"{room}","decisionId":"{}","optionId":"option-1"}}"#,
                decision.id
            ),
        )
        .await;
    assert_eq!(error_text(only(&mut b)), "Room has concluded");
}

#[tokio::test]
async fn chat_is_limited_to_members() {
    let service = CollaborationService::new();
    let (room, mut a, mut b) = room_with_two_members(&service).await;
    let mut outsider = service.connect("conn-c").await;
    service
        .handle_text("conn-c", r#"{"type":"authenticate","userId":"carol"}"#)
        .await;
    drain(&mut outsider);

    let chat = format!(r#"{{"type":"chat_message","roomId":"{room}","text":"Numbers are in"}}"#);
    service.handle_text("conn-c", &chat).await;
    assert_eq!(error_text(only(&mut outsider)), "Not a member of this room");

    service.handle_text("conn-a", &chat).await;
    assert_matches!(only(&mut a), ServerMessage::RoomUpdate { room } if room.chat.len() == 1);
    assert_matches!(
        only(&mut b),
        ServerMessage::ChatMessage { message, .. } if message.text == "Numbers are in" && message.user_id == "alice"
    );
}

#[tokio::test]
async fn leaving_notifies_the_leaver_and_the_rest() {
    let service = CollaborationService::new();
    let (room, mut a, mut b) = room_with_two_members(&service).await;

    service
        .handle_text("conn-b", &format!(r#"{{"type":"leave_room","roomId":"{room}"}}"#))
        .await;
    assert_matches!(
        only(&mut a),
        ServerMessage::UserLeft { user_id, participant_count: 1, .. } if user_id == "bob"
    );
    assert_matches!(only(&mut b), ServerMessage::UserLeft { .. });

    service
        .handle_text("conn-b", &format!(r#"{{"type":"leave_room","roomId":"{room}"}}"#))
        .await;
    assert_eq!(error_text(only(&mut b)), "Not a member of this room");
}

#[tokio::test]
async fn disconnect_leaves_rooms_but_keeps_them_open() {
    let service = CollaborationService::new();
    let (room, mut a, _b) = room_with_two_members(&service).await;

    service.disconnect("conn-b").await;
    assert_matches!(
        only(&mut a),
        ServerMessage::UserLeft { user_id, participant_count: 1, .. } if user_id == "bob"
    );

    service.disconnect("conn-a").await;
    let snapshot = service.room_snapshot(&room).await.expect("empty room stays open");
    assert!(snapshot.participants.is_empty());
    assert_eq!(service.connections().connection_count().await, 0);
}

#[tokio::test]
async fn user_with_two_tabs_stays_until_the_last_one_leaves() {
    let service = CollaborationService::new();
    let mut tab1 = service.connect("tab-1").await;
    let mut tab2 = service.connect("tab-2").await;
    let mut bob = service.connect("conn-b").await;
    let room = service.open_room(None, "Pricing", None).await.unwrap();

    join(&service, "tab-1", &room.id, "alice").await;
    join(&service, "tab-2", &room.id, "alice").await;
    join(&service, "conn-b", &room.id, "bob").await;
    drain(&mut tab1);
    drain(&mut tab2);
    drain(&mut bob);

    service.disconnect("tab-1").await;
    assert!(drain(&mut tab2).is_empty());
    assert!(drain(&mut bob).is_empty());
    let snapshot = service.room_snapshot(&room.id).await.unwrap();
    let mut present: Vec<&str> = snapshot.participants.iter().map(|p| p.user_id.as_str()).collect();
    present.sort();
    assert_eq!(present, vec!["alice", "bob"]);

    service.disconnect("tab-2").await;
    assert_matches!(
        only(&mut bob),
        ServerMessage::UserLeft { user_id, participant_count: 1, .. } if user_id == "alice"
    );
}

#[tokio::test]
async fn rejoining_elsewhere_as_another_user_keeps_the_first_room_identity() {
    let service = CollaborationService::new();
    let mut conn = service.connect("conn-c").await;
    let mut olivia = service.connect("conn-o").await;
    let first = service.open_room(None, "Pricing", None).await.unwrap();
    let second = service.open_room(None, "Hiring", None).await.unwrap();

    join(&service, "conn-o", &first.id, "olivia").await;
    join(&service, "conn-c", &first.id, "alice").await;
    join(&service, "conn-c", &second.id, "bob").await;
    drain(&mut conn);
    drain(&mut olivia);

    // Actions in the first room still speak for alice.
    service
        .handle_text(
            "conn-c",
            &format!(r#"{{"type":"chat_message","roomId":"{}","text":"hello"}}"#, first.id),
        )
        .await;
    assert_matches!(
        only(&mut olivia),
        ServerMessage::ChatMessage { message, .. } if message.user_id == "alice"
    );
    drain(&mut conn);

    service.disconnect("conn-c").await;
    assert_matches!(
        only(&mut olivia),
        ServerMessage::UserLeft { user_id, participant_count: 1, .. } if user_id == "alice"
    );
    let first = service.room_snapshot(&first.id).await.unwrap();
    let present: Vec<&str> = first.participants.iter().map(|p| p.user_id.as_str()).collect();
    assert_eq!(present, vec!["olivia"]);
    let second = service.room_snapshot(&second.id).await.unwrap();
    assert!(second.participants.is_empty());
}

#[tokio::test]
async fn closing_a_room_notifies_members_and_forgets_it() {
    let service = CollaborationService::new();
    let (room, mut a, mut b) = room_with_two_members(&service).await;

    assert!(service.close_room(&room, "session_ended").await);
    for rx in [&mut a, &mut b] {
        assert_matches!(
            only(rx),
            ServerMessage::RoomClosed { reason, .. } if reason == "session_ended"
        );
    }
    assert!(!service.close_room(&room, "session_ended").await);

    join(&service, "conn-a", &room, "alice").await;
    assert_eq!(error_text(only(&mut a)), "Room not found");
}

#[tokio::test]
async fn opening_an_existing_room_id_returns_it_unchanged() {
    let service = CollaborationService::new();
    let mut rx = service.connect("conn-1").await;
    drain(&mut rx);

    let first = service
        .open_room(Some("session-1".to_string()), "Recall response", None)
        .await
        .unwrap();
    assert_matches!(only(&mut rx), ServerMessage::RoomCreated { .. });

    let second = service
        .open_room(Some("session-1".to_string()), "Renamed", None)
        .await
        .unwrap();
    assert_eq!(second.name, first.name);
    assert!(drain(&mut rx).is_empty());
    assert_eq!(service.room_count().await, 1);

    assert_eq!(service.close_all("reset").await, 1);
    assert_eq!(service.room_count().await, 0);
}

#[tokio::test]
async fn shutdown_sends_close_frames() {
    let service = CollaborationService::new();
    let mut rx = service.connect("conn-1").await;
    drain(&mut rx);

    service.connections().shutdown_all().await;

    assert_matches!(rx.try_recv(), Ok(Message::Close(None)));
    assert_eq!(service.connections().connection_count().await, 0);
}
