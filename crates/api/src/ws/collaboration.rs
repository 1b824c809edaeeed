//! Decision-room collaboration over WebSocket.
//!
//! [`CollaborationService`] owns the connection manager and the room
//! registry. Every inbound frame is applied to room state under the registry
//! lock, which produces a list of deliveries; the lock is released before the
//! deliveries are pushed to socket channels.

use axum::extract::ws::Message;
use bastion_core::collaboration::{
    ClientMessage, Participant, Room, RoomError, RoomPhase, RoomSnapshot, RoomSummary,
    ServerMessage,
};
use bastion_core::error::CoreError;
use bastion_core::status::validate_name;
use bastion_core::types::DbId;
use tokio::sync::{mpsc, RwLock};

use crate::ws::manager::WsManager;
use crate::ws::rooms::RoomRegistry;

/// Reason sent in `room_closed` when a client closes a room.
pub const REASON_CLOSED: &str = "closed";

/// Reason sent in `room_closed` when its war-room session ends.
pub const REASON_SESSION_ENDED: &str = "session_ended";

/// Reason sent in `room_closed` when demo data is wiped.
pub const REASON_RESET: &str = "reset";

enum Recipients {
    Conns(Vec<String>),
    Everyone,
}

struct Delivery {
    to: Recipients,
    message: ServerMessage,
}

impl Delivery {
    fn to_conns(to: Vec<String>, message: ServerMessage) -> Self {
        Self {
            to: Recipients::Conns(to),
            message,
        }
    }

    fn to_one(conn_id: &str, message: ServerMessage) -> Self {
        Self::to_conns(vec![conn_id.to_string()], message)
    }

    fn to_everyone(message: ServerMessage) -> Self {
        Self {
            to: Recipients::Everyone,
            message,
        }
    }
}

type Outbox = Vec<Delivery>;

/// Connection registry plus decision rooms, shared via `Arc`.
pub struct CollaborationService {
    connections: WsManager,
    rooms: RwLock<RoomRegistry>,
}

impl CollaborationService {
    pub fn new() -> Self {
        Self {
            connections: WsManager::new(),
            rooms: RwLock::new(RoomRegistry::new()),
        }
    }

    pub fn connections(&self) -> &WsManager {
        &self.connections
    }

    /// Register a socket and greet it with `connected`.
    pub async fn connect(&self, conn_id: &str) -> mpsc::UnboundedReceiver<Message> {
        let rx = self.connections.add(conn_id.to_string()).await;
        self.connections
            .send_to(
                conn_id,
                &ServerMessage::Connected {
                    connection_id: conn_id.to_string(),
                },
            )
            .await;
        rx
    }

    /// Parse and apply one text frame. Malformed frames get an `error`
    /// reply; the connection stays open.
    pub async fn handle_text(&self, conn_id: &str, text: &str) {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => self.handle_message(conn_id, message).await,
            Err(e) => {
                tracing::debug!(conn_id, error = %e, "Malformed WebSocket frame");
                self.connections
                    .send_to(conn_id, &ServerMessage::error(format!("Invalid message: {e}")))
                    .await;
            }
        }
    }

    /// Apply a parsed client frame and push the resulting frames.
    pub async fn handle_message(&self, conn_id: &str, message: ClientMessage) {
        let result = match message {
            ClientMessage::Authenticate { user_id, user_name } => {
                self.authenticate(conn_id, user_id, user_name).await
            }
            ClientMessage::JoinRoom {
                room_id,
                user_id,
                user_name,
            } => self.join_room(conn_id, &room_id, user_id, user_name).await,
            ClientMessage::LeaveRoom { room_id } => self.leave_room(conn_id, &room_id).await,
            ClientMessage::CreateRoom { name, scenario_id } => {
                self.create_room_for(conn_id, &name, scenario_id).await
            }
            ClientMessage::CloseRoom { room_id } => self.close_room_for(conn_id, &room_id).await,
            ClientMessage::CreateDecision {
                room_id,
                title,
                description,
                options,
            } => {
                self.create_decision(conn_id, &room_id, &title, description, &options)
                    .await
            }
            ClientMessage::CastVote {
                room_id,
                decision_id,
                option_id,
                rationale,
                confidence,
            } => {
                self.cast_vote(conn_id, &room_id, &decision_id, &option_id, rationale, confidence)
                    .await
            }
            ClientMessage::ChangePhase { room_id, phase } => {
                self.change_phase(conn_id, &room_id, phase).await
            }
            ClientMessage::ChatMessage { room_id, text } => {
                self.chat(conn_id, &room_id, &text).await
            }
            ClientMessage::Ping => Ok(vec![Delivery::to_one(
                conn_id,
                ServerMessage::Pong {
                    timestamp: chrono::Utc::now(),
                },
            )]),
            ClientMessage::Pong => Ok(Vec::new()),
        };

        match result {
            Ok(outbox) => self.deliver(outbox).await,
            Err(err) => {
                tracing::debug!(conn_id, error = %err, "Collaboration message rejected");
                self.connections
                    .send_to(conn_id, &ServerMessage::error(err.to_string()))
                    .await;
            }
        }
    }

    /// Open a room outside the socket protocol (REST, war-room start).
    ///
    /// With an explicit `id` that is already open, the existing room is
    /// returned unchanged. A new room is announced to every socket.
    pub async fn open_room(
        &self,
        id: Option<String>,
        name: &str,
        scenario_id: Option<DbId>,
    ) -> Result<RoomSnapshot, RoomError> {
        validate_room_name(name)?;

        let snapshot = {
            let mut rooms = self.rooms.write().await;
            if let Some(existing) = id.as_deref().and_then(|id| rooms.get(id)) {
                return Ok(existing.snapshot());
            }
            let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let room = Room::new(id, name.trim(), scenario_id);
            let snapshot = room.snapshot();
            rooms.insert(room);
            snapshot
        };

        tracing::info!(room_id = %snapshot.id, name = %snapshot.name, "Decision room opened");
        self.deliver(vec![Delivery::to_everyone(ServerMessage::RoomCreated {
            room: snapshot.clone(),
        })])
        .await;
        Ok(snapshot)
    }

    /// Close a room: every member receives `room_closed`, then the room and
    /// its membership are dropped. Returns `false` if it was not open.
    pub async fn close_room(&self, room_id: &str, reason: &str) -> bool {
        let removed = self.rooms.write().await.remove(room_id);
        let Some((_, members)) = removed else {
            return false;
        };
        tracing::info!(room_id, reason, members = members.len(), "Decision room closed");
        self.connections
            .send_to_many(
                &members,
                &ServerMessage::RoomClosed {
                    room_id: room_id.to_string(),
                    reason: reason.to_string(),
                },
            )
            .await;
        true
    }

    /// Close every open room. Returns how many were closed.
    pub async fn close_all(&self, reason: &str) -> usize {
        let ids = self.rooms.read().await.room_ids();
        let mut closed = 0;
        for id in ids {
            if self.close_room(&id, reason).await {
                closed += 1;
            }
        }
        closed
    }

    /// Forget a socket: it leaves every room it joined and the remaining
    /// members receive `user_left` for users with no connection left there.
    /// Empty rooms stay open.
    pub async fn disconnect(&self, conn_id: &str) {
        self.connections.remove(conn_id).await;

        let outbox = {
            let mut rooms = self.rooms.write().await;
            rooms
                .rooms_of(conn_id)
                .into_iter()
                .filter_map(|room_id| detach(&mut rooms, &room_id, conn_id))
                .collect::<Outbox>()
        };
        self.deliver(outbox).await;
    }

    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        self.rooms.read().await.summaries()
    }

    pub async fn room_snapshot(&self, room_id: &str) -> Option<RoomSnapshot> {
        self.rooms.read().await.get(room_id).map(Room::snapshot)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Push a frame to every connected socket.
    pub async fn notify_all(&self, message: &ServerMessage) {
        self.connections.broadcast(message).await;
    }

    // -----------------------------------------------------------------------
    // Frame handlers
    // -----------------------------------------------------------------------

    async fn authenticate(
        &self,
        conn_id: &str,
        user_id: String,
        user_name: Option<String>,
    ) -> Result<Outbox, RoomError> {
        let participant = participant_from(user_id, user_name).ok_or(RoomError::NotAuthenticated)?;
        let user_id = participant.user_id.clone();
        self.connections.identify(conn_id, participant).await;
        tracing::debug!(conn_id, user_id = %user_id, "WebSocket identified");
        Ok(vec![Delivery::to_one(
            conn_id,
            ServerMessage::Authenticated { user_id },
        )])
    }

    async fn join_room(
        &self,
        conn_id: &str,
        room_id: &str,
        user_id: Option<String>,
        user_name: Option<String>,
    ) -> Result<Outbox, RoomError> {
        if !self.rooms.read().await.contains(room_id) {
            return Err(RoomError::RoomNotFound);
        }

        let participant = match user_id.and_then(|id| participant_from(id, user_name)) {
            Some(participant) => {
                self.connections.identify(conn_id, participant.clone()).await;
                participant
            }
            None => self.identity(conn_id).await?,
        };

        let mut rooms = self.rooms.write().await;
        if !rooms.contains(room_id) {
            return Err(RoomError::RoomNotFound);
        }

        // Rejoining under another user id retires the previous identity here.
        let mut outbox = Outbox::new();
        let previous = rooms.member(room_id, conn_id).map(|p| p.user_id.clone());
        if previous.is_some_and(|user_id| user_id != participant.user_id) {
            outbox.extend(detach(&mut rooms, room_id, conn_id));
        }

        rooms.join(room_id, conn_id, participant.clone());
        let room = rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;
        room.add_participant(participant.clone());
        let snapshot = room.snapshot();
        let participant_count = room.participant_count();
        let others = rooms.others(room_id, conn_id);

        outbox.push(Delivery::to_one(conn_id, ServerMessage::RoomUpdate { room: snapshot }));
        outbox.push(Delivery::to_conns(
            others,
            ServerMessage::UserJoined {
                room_id: room_id.to_string(),
                user: participant,
                participant_count,
            },
        ));
        Ok(outbox)
    }

    async fn leave_room(&self, conn_id: &str, room_id: &str) -> Result<Outbox, RoomError> {
        let mut rooms = self.rooms.write().await;
        if !rooms.contains(room_id) {
            return Err(RoomError::RoomNotFound);
        }
        let user_id = rooms
            .member(room_id, conn_id)
            .map(|p| p.user_id.clone())
            .ok_or(RoomError::NotMember)?;

        let mut outbox: Outbox = detach(&mut rooms, room_id, conn_id).into_iter().collect();
        let participant_count = rooms.get(room_id).map_or(0, Room::participant_count);
        outbox.push(Delivery::to_one(
            conn_id,
            ServerMessage::UserLeft {
                room_id: room_id.to_string(),
                user_id,
                participant_count,
            },
        ));
        Ok(outbox)
    }

    async fn create_room_for(
        &self,
        conn_id: &str,
        name: &str,
        scenario_id: Option<DbId>,
    ) -> Result<Outbox, RoomError> {
        let participant = self.identity(conn_id).await?;
        validate_room_name(name)?;

        let mut room = Room::new(uuid::Uuid::new_v4().to_string(), name.trim(), scenario_id);
        room.add_participant(participant.clone());
        let snapshot = room.snapshot();

        let mut rooms = self.rooms.write().await;
        rooms.insert(room);
        rooms.join(&snapshot.id, conn_id, participant);
        tracing::info!(room_id = %snapshot.id, conn_id, "Decision room created");

        Ok(vec![Delivery::to_everyone(ServerMessage::RoomCreated {
            room: snapshot,
        })])
    }

    async fn close_room_for(&self, conn_id: &str, room_id: &str) -> Result<Outbox, RoomError> {
        let removed = self.rooms.write().await.remove(room_id);
        let (_, members) = removed.ok_or(RoomError::RoomNotFound)?;
        tracing::info!(room_id, conn_id, "Decision room closed by client");

        let mut to: Vec<String> = members.into_iter().collect();
        if !to.iter().any(|id| id == conn_id) {
            to.push(conn_id.to_string());
        }
        Ok(vec![Delivery::to_conns(
            to,
            ServerMessage::RoomClosed {
                room_id: room_id.to_string(),
                reason: REASON_CLOSED.to_string(),
            },
        )])
    }

    async fn create_decision(
        &self,
        conn_id: &str,
        room_id: &str,
        title: &str,
        description: Option<String>,
        options: &[String],
    ) -> Result<Outbox, RoomError> {
        self.identity(conn_id).await?;
        let mut rooms = self.rooms.write().await;
        let (room, participant) = member_room(&mut rooms, room_id, conn_id)?;

        let decision = room
            .create_decision(title, description, options, &participant.user_id)?
            .clone();
        let snapshot = room.snapshot();
        let others = rooms.others(room_id, conn_id);

        Ok(vec![
            Delivery::to_conns(
                others,
                ServerMessage::DecisionCreated {
                    room_id: room_id.to_string(),
                    decision,
                },
            ),
            Delivery::to_one(conn_id, ServerMessage::RoomUpdate { room: snapshot }),
        ])
    }

    async fn cast_vote(
        &self,
        conn_id: &str,
        room_id: &str,
        decision_id: &str,
        option_id: &str,
        rationale: Option<String>,
        confidence: Option<u8>,
    ) -> Result<Outbox, RoomError> {
        self.identity(conn_id).await?;
        let mut rooms = self.rooms.write().await;
        let (room, participant) = member_room(&mut rooms, room_id, conn_id)?;

        let decision = room.cast_vote(
            decision_id,
            &participant.user_id,
            option_id,
            rationale,
            confidence,
        )?;
        let options = decision.options.clone();
        let total_votes = decision.total_votes;
        let others = rooms.others(room_id, conn_id);

        Ok(vec![
            Delivery::to_conns(
                others,
                ServerMessage::VoteCast {
                    room_id: room_id.to_string(),
                    decision_id: decision_id.to_string(),
                    user_id: participant.user_id,
                    option_id: option_id.to_string(),
                    options,
                    total_votes,
                },
            ),
            Delivery::to_one(
                conn_id,
                ServerMessage::VoteRecorded {
                    room_id: room_id.to_string(),
                    decision_id: decision_id.to_string(),
                    option_id: option_id.to_string(),
                    total_votes,
                },
            ),
        ])
    }

    async fn change_phase(
        &self,
        conn_id: &str,
        room_id: &str,
        phase: RoomPhase,
    ) -> Result<Outbox, RoomError> {
        self.identity(conn_id).await?;
        let mut rooms = self.rooms.write().await;
        let (room, participant) = member_room(&mut rooms, room_id, conn_id)?;

        room.change_phase(phase)?;
        let snapshot = room.snapshot();
        let others = rooms.others(room_id, conn_id);

        Ok(vec![
            Delivery::to_conns(
                others,
                ServerMessage::PhaseChanged {
                    room_id: room_id.to_string(),
                    phase,
                    changed_by: participant.user_id,
                },
            ),
            Delivery::to_one(conn_id, ServerMessage::RoomUpdate { room: snapshot }),
        ])
    }

    async fn chat(&self, conn_id: &str, room_id: &str, text: &str) -> Result<Outbox, RoomError> {
        self.identity(conn_id).await?;
        let mut rooms = self.rooms.write().await;
        let (room, participant) = member_room(&mut rooms, room_id, conn_id)?;

        let message = room.post_chat(&participant, text)?.clone();
        let snapshot = room.snapshot();
        let others = rooms.others(room_id, conn_id);

        Ok(vec![
            Delivery::to_conns(
                others,
                ServerMessage::ChatMessage {
                    room_id: room_id.to_string(),
                    message,
                },
            ),
            Delivery::to_one(conn_id, ServerMessage::RoomUpdate { room: snapshot }),
        ])
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn identity(&self, conn_id: &str) -> Result<Participant, RoomError> {
        self.connections
            .participant(conn_id)
            .await
            .ok_or(RoomError::NotAuthenticated)
    }

    async fn deliver(&self, outbox: Outbox) {
        for delivery in outbox {
            match delivery.to {
                Recipients::Conns(to) => {
                    if !to.is_empty() {
                        self.connections.send_to_many(&to, &delivery.message).await;
                    }
                }
                Recipients::Everyone => self.connections.broadcast(&delivery.message).await,
            }
        }
    }
}

impl Default for CollaborationService {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_room_name(name: &str) -> Result<(), RoomError> {
    validate_name("name", name).map_err(|e| match e {
        CoreError::Validation(msg) => RoomError::InvalidRoom(msg),
        other => RoomError::InvalidRoom(other.to_string()),
    })
}

fn participant_from(user_id: String, user_name: Option<String>) -> Option<Participant> {
    let user_id = user_id.trim().to_string();
    if user_id.is_empty() {
        return None;
    }
    let user_name = user_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| user_id.clone());
    Some(Participant { user_id, user_name })
}

/// Resolve a room the connection has joined, for actions restricted to
/// members, together with the participant it joined as.
fn member_room<'a>(
    rooms: &'a mut RoomRegistry,
    room_id: &str,
    conn_id: &str,
) -> Result<(&'a mut Room, Participant), RoomError> {
    if !rooms.contains(room_id) {
        return Err(RoomError::RoomNotFound);
    }
    let participant = rooms
        .member(room_id, conn_id)
        .cloned()
        .ok_or(RoomError::NotMember)?;
    let room = rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;
    Ok((room, participant))
}

/// Remove a connection from one room. When it was the user's last
/// connection there, the user leaves the roster and the remaining members
/// get a `user_left` delivery.
fn detach(rooms: &mut RoomRegistry, room_id: &str, conn_id: &str) -> Option<Delivery> {
    let participant = rooms.leave(room_id, conn_id)?;
    if rooms.has_user(room_id, &participant.user_id) {
        return None;
    }
    let room = rooms.get_mut(room_id)?;
    room.remove_participant(&participant.user_id);
    let participant_count = room.participant_count();

    Some(Delivery::to_conns(
        rooms.members(room_id),
        ServerMessage::UserLeft {
            room_id: room_id.to_string(),
            user_id: participant.user_id.clone(),
            participant_count,
        },
    ))
}
