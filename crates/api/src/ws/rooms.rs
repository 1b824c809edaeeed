//! In-memory registry of open decision rooms and their socket membership.

use std::collections::HashMap;

use bastion_core::collaboration::{Participant, Room, RoomSummary};

/// Rooms by id, plus the connections joined to each and the participant
/// every connection joined as.
///
/// One user may hold several connections in the same room; the room roster
/// keeps the user until the last of them is gone.
///
/// Not synchronized on its own; the collaboration service guards it.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    members: HashMap<String, HashMap<String, Participant>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, room: Room) {
        self.members.entry(room.id.clone()).or_default();
        self.rooms.insert(room.id.clone(), room);
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn get(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// Remove a room together with its member connection ids.
    pub fn remove(&mut self, room_id: &str) -> Option<(Room, Vec<String>)> {
        let room = self.rooms.remove(room_id)?;
        let members = self
            .members
            .remove(room_id)
            .map(|set| set.into_keys().collect())
            .unwrap_or_default();
        Some((room, members))
    }

    /// Add a connection to a room as `participant`, replacing whoever it
    /// joined as before. Returns `false` if the room does not exist.
    pub fn join(&mut self, room_id: &str, conn_id: &str, participant: Participant) -> bool {
        if !self.rooms.contains_key(room_id) {
            return false;
        }
        self.members
            .entry(room_id.to_string())
            .or_default()
            .insert(conn_id.to_string(), participant);
        true
    }

    /// Remove a connection from a room, returning who it had joined as.
    pub fn leave(&mut self, room_id: &str, conn_id: &str) -> Option<Participant> {
        self.members.get_mut(room_id)?.remove(conn_id)
    }

    pub fn is_member(&self, room_id: &str, conn_id: &str) -> bool {
        self.member(room_id, conn_id).is_some()
    }

    /// The participant a connection joined a room as.
    pub fn member(&self, room_id: &str, conn_id: &str) -> Option<&Participant> {
        self.members.get(room_id)?.get(conn_id)
    }

    /// Whether any connection in the room is joined as `user_id`.
    pub fn has_user(&self, room_id: &str, user_id: &str) -> bool {
        self.members
            .get(room_id)
            .is_some_and(|set| set.values().any(|p| p.user_id == user_id))
    }

    /// Connection ids joined to a room.
    pub fn members(&self, room_id: &str) -> Vec<String> {
        self.members
            .get(room_id)
            .map(|set| set.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Members of a room other than `conn_id`.
    pub fn others(&self, room_id: &str, conn_id: &str) -> Vec<String> {
        self.members
            .get(room_id)
            .map(|set| set.keys().filter(|id| *id != conn_id).cloned().collect())
            .unwrap_or_default()
    }

    /// Ids of every room a connection is joined to.
    pub fn rooms_of(&self, conn_id: &str) -> Vec<String> {
        self.members
            .iter()
            .filter(|(_, set)| set.contains_key(conn_id))
            .map(|(room_id, _)| room_id.clone())
            .collect()
    }

    pub fn room_ids(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }

    /// Summaries of every room, oldest first.
    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self.rooms.values().map(Room::summary).collect();
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        summaries
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
