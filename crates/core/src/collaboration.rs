//! Decision rooms and the collaboration WebSocket protocol.
//!
//! This module lives in `core` (zero I/O) so that the WebSocket registry, the
//! REST handlers that open/close rooms, and tests can all share the same room
//! state machine and message shapes. Rooms exist only in memory; nothing here
//! is persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Maximum length of a single chat message, in characters.
pub const MAX_CHAT_LEN: usize = 2000;

/// Number of chat entries retained per room.
pub const CHAT_HISTORY_LIMIT: usize = 200;

/// Minimum number of distinct options a decision must offer.
pub const MIN_DECISION_OPTIONS: usize = 2;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejections produced by room operations. The `Display` text is sent to the
/// client verbatim in an `error` frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Decision not found")]
    DecisionNotFound,

    #[error("Option not found for this decision")]
    OptionNotFound,

    #[error("Room has concluded")]
    RoomConcluded,

    #[error("Not a member of this room")]
    NotMember,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid room: {0}")]
    InvalidRoom(String),

    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    #[error("Confidence must be between 0 and 100")]
    InvalidConfidence,

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("Message exceeds {} characters", MAX_CHAT_LEN)]
    MessageTooLong,
}

// ---------------------------------------------------------------------------
// Room model
// ---------------------------------------------------------------------------

/// A connected user as seen by other room members.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: String,
    pub user_name: String,
}

/// Phase of a decision room. `Concluded` is terminal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoomPhase {
    #[default]
    Briefing,
    Discussion,
    Voting,
    Concluded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOption {
    pub id: String,
    pub label: String,
    pub support_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub user_id: String,
    pub option_id: String,
    pub rationale: Option<String>,
    pub confidence: Option<u8>,
    pub cast_at: Timestamp,
}

/// A votable question inside a room. Each user holds at most one vote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub options: Vec<DecisionOption>,
    pub votes: BTreeMap<String, Vote>,
    pub total_votes: usize,
    pub created_by: String,
    pub created_at: Timestamp,
}

impl Decision {
    /// Recompute every option's `support_count` and the vote total from the
    /// current (non-superseded) votes.
    fn recount(&mut self) {
        for option in &mut self.options {
            option.support_count = self
                .votes
                .values()
                .filter(|v| v.option_id == option.id)
                .count() as u32;
        }
        self.total_votes = self.votes.len();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub sent_at: Timestamp,
}

/// Serializable view of a room sent in `room_update` / `room_created`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: String,
    pub name: String,
    pub scenario_id: Option<DbId>,
    pub phase: RoomPhase,
    pub participants: Vec<Participant>,
    pub decisions: Vec<Decision>,
    pub chat: Vec<ChatEntry>,
    pub created_at: Timestamp,
}

/// Summary row for room listings.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub scenario_id: Option<DbId>,
    pub phase: RoomPhase,
    pub participant_count: usize,
    pub decision_count: usize,
    pub created_at: Timestamp,
}

/// In-memory state of one decision room.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub scenario_id: Option<DbId>,
    pub phase: RoomPhase,
    pub created_at: Timestamp,
    participants: BTreeMap<String, Participant>,
    decisions: Vec<Decision>,
    chat: Vec<ChatEntry>,
}

impl Room {
    pub fn new(id: impl Into<String>, name: impl Into<String>, scenario_id: Option<DbId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            scenario_id,
            phase: RoomPhase::default(),
            created_at: chrono::Utc::now(),
            participants: BTreeMap::new(),
            decisions: Vec::new(),
            chat: Vec::new(),
        }
    }

    /// Add (or refresh the display name of) a participant.
    pub fn add_participant(&mut self, participant: Participant) {
        self.participants
            .insert(participant.user_id.clone(), participant);
    }

    /// Remove a participant. Returns `true` if they were present.
    pub fn remove_participant(&mut self, user_id: &str) -> bool {
        self.participants.remove(user_id).is_some()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn decision(&self, decision_id: &str) -> Option<&Decision> {
        self.decisions.iter().find(|d| d.id == decision_id)
    }

    /// Create a decision with the given option labels.
    ///
    /// Labels are trimmed; blank and duplicate labels are rejected.
    pub fn create_decision(
        &mut self,
        title: &str,
        description: Option<String>,
        option_labels: &[String],
        created_by: &str,
    ) -> Result<&Decision, RoomError> {
        if self.phase == RoomPhase::Concluded {
            return Err(RoomError::RoomConcluded);
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(RoomError::InvalidDecision("title must not be empty".into()));
        }

        let mut labels: Vec<&str> = Vec::with_capacity(option_labels.len());
        for label in option_labels.iter().map(|l| l.trim()) {
            if label.is_empty() {
                return Err(RoomError::InvalidDecision(
                    "option labels must not be empty".into(),
                ));
            }
            if labels.contains(&label) {
                return Err(RoomError::InvalidDecision(format!(
                    "duplicate option '{label}'"
                )));
            }
            labels.push(label);
        }
        if labels.len() < MIN_DECISION_OPTIONS {
            return Err(RoomError::InvalidDecision(format!(
                "at least {MIN_DECISION_OPTIONS} options are required"
            )));
        }

        let decision = Decision {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            description,
            options: labels
                .iter()
                .enumerate()
                .map(|(i, label)| DecisionOption {
                    id: format!("option-{}", i + 1),
                    label: (*label).to_string(),
                    support_count: 0,
                })
                .collect(),
            votes: BTreeMap::new(),
            total_votes: 0,
            created_by: created_by.to_string(),
            created_at: chrono::Utc::now(),
        };
        let index = self.decisions.len();
        self.decisions.push(decision);
        Ok(&self.decisions[index])
    }

    /// Record `user_id`'s vote, replacing any vote they already cast on the
    /// same decision, and return the recounted decision.
    pub fn cast_vote(
        &mut self,
        decision_id: &str,
        user_id: &str,
        option_id: &str,
        rationale: Option<String>,
        confidence: Option<u8>,
    ) -> Result<&Decision, RoomError> {
        if self.phase == RoomPhase::Concluded {
            return Err(RoomError::RoomConcluded);
        }
        if confidence.is_some_and(|c| c > 100) {
            return Err(RoomError::InvalidConfidence);
        }

        let decision = self
            .decisions
            .iter_mut()
            .find(|d| d.id == decision_id)
            .ok_or(RoomError::DecisionNotFound)?;
        if !decision.options.iter().any(|o| o.id == option_id) {
            return Err(RoomError::OptionNotFound);
        }

        decision.votes.insert(
            user_id.to_string(),
            Vote {
                user_id: user_id.to_string(),
                option_id: option_id.to_string(),
                rationale,
                confidence,
                cast_at: chrono::Utc::now(),
            },
        );
        decision.recount();
        Ok(decision)
    }

    /// Move the room to `phase`. A concluded room cannot change phase.
    pub fn change_phase(&mut self, phase: RoomPhase) -> Result<(), RoomError> {
        if self.phase == RoomPhase::Concluded {
            return Err(RoomError::RoomConcluded);
        }
        self.phase = phase;
        Ok(())
    }

    /// Append a chat message, trimming history to [`CHAT_HISTORY_LIMIT`].
    pub fn post_chat(&mut self, author: &Participant, text: &str) -> Result<&ChatEntry, RoomError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RoomError::EmptyMessage);
        }
        if text.chars().count() > MAX_CHAT_LEN {
            return Err(RoomError::MessageTooLong);
        }

        self.chat.push(ChatEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: author.user_id.clone(),
            user_name: author.user_name.clone(),
            text: text.to_string(),
            sent_at: chrono::Utc::now(),
        });
        if self.chat.len() > CHAT_HISTORY_LIMIT {
            let excess = self.chat.len() - CHAT_HISTORY_LIMIT;
            self.chat.drain(..excess);
        }
        let last = self.chat.len() - 1;
        Ok(&self.chat[last])
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            scenario_id: self.scenario_id,
            phase: self.phase,
            participants: self.participants.values().cloned().collect(),
            decisions: self.decisions.clone(),
            chat: self.chat.clone(),
            created_at: self.created_at,
        }
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            scenario_id: self.scenario_id,
            phase: self.phase,
            participant_count: self.participants.len(),
            decision_count: self.decisions.len(),
            created_at: self.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire protocol
// ---------------------------------------------------------------------------

/// Frames sent by browser clients.
///
/// Serialized as JSON with an internally-tagged `"type"` discriminator in
/// snake_case and camelCase field names, e.g.
/// `{"type":"cast_vote","roomId":"..","decisionId":"..","optionId":"option-1"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Authenticate {
        user_id: String,
        user_name: Option<String>,
    },
    JoinRoom {
        room_id: String,
        user_id: Option<String>,
        user_name: Option<String>,
    },
    LeaveRoom {
        room_id: String,
    },
    CreateRoom {
        name: String,
        scenario_id: Option<DbId>,
    },
    CloseRoom {
        room_id: String,
    },
    CreateDecision {
        room_id: String,
        title: String,
        description: Option<String>,
        options: Vec<String>,
    },
    CastVote {
        room_id: String,
        decision_id: String,
        option_id: String,
        rationale: Option<String>,
        confidence: Option<u8>,
    },
    ChangePhase {
        room_id: String,
        phase: RoomPhase,
    },
    ChatMessage {
        room_id: String,
        text: String,
    },
    Ping,
    Pong,
}

/// Frames pushed by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Connected {
        connection_id: String,
    },
    Authenticated {
        user_id: String,
    },
    RoomCreated {
        room: RoomSnapshot,
    },
    RoomUpdate {
        room: RoomSnapshot,
    },
    UserJoined {
        room_id: String,
        user: Participant,
        participant_count: usize,
    },
    UserLeft {
        room_id: String,
        user_id: String,
        participant_count: usize,
    },
    DecisionCreated {
        room_id: String,
        decision: Decision,
    },
    VoteCast {
        room_id: String,
        decision_id: String,
        user_id: String,
        option_id: String,
        options: Vec<DecisionOption>,
        total_votes: usize,
    },
    VoteRecorded {
        room_id: String,
        decision_id: String,
        option_id: String,
        total_votes: usize,
    },
    PhaseChanged {
        room_id: String,
        phase: RoomPhase,
        changed_by: String,
    },
    ChatMessage {
        room_id: String,
        message: ChatEntry,
    },
    RoomClosed {
        room_id: String,
        reason: String,
    },
    EntityChanged {
        entity: String,
        action: String,
        id: Option<DbId>,
        organization_id: Option<DbId>,
    },
    Error {
        message: String,
    },
    Pong {
        timestamp: Timestamp,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
