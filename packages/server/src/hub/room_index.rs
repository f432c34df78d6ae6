//! Room identifier -> subscribed connections.

use std::collections::{HashMap, HashSet};

use crate::domain::{ConnectionId, RoomId};

/// Forward index of room membership.
///
/// Only the hub loop mutates it. The reverse direction lives on each
/// connection entry, and the hub keeps the two in step.
#[derive(Debug, Default)]
pub(super) struct RoomIndex {
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl RoomIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the connection was already a member
    pub fn insert(&mut self, room_id: RoomId, connection_id: ConnectionId) -> bool {
        self.rooms.entry(room_id).or_default().insert(connection_id)
    }

    /// Returns `false` if the connection was not a member.
    /// Rooms left without members are dropped from the index.
    pub fn remove(&mut self, room_id: RoomId, connection_id: ConnectionId) -> bool {
        let Some(members) = self.rooms.get_mut(&room_id) else {
            return false;
        };
        let removed = members.remove(&connection_id);
        if members.is_empty() {
            self.rooms.remove(&room_id);
        }
        removed
    }

    pub fn members(&self, room_id: RoomId) -> Option<&HashSet<ConnectionId>> {
        self.rooms.get(&room_id)
    }

    pub fn contains(&self, room_id: RoomId, connection_id: ConnectionId) -> bool {
        self.rooms
            .get(&room_id)
            .is_some_and(|members| members.contains(&connection_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RoomId, &HashSet<ConnectionId>)> {
        self.rooms.iter()
    }
}
