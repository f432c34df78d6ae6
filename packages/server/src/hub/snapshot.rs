//! Point-in-time view of hub state, taken between two command-loop steps.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{ConnectionId, Identity, RoomId};

use super::ConnectionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub identity: Identity,
    pub state: ConnectionState,
    pub rooms: BTreeSet<RoomId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubSnapshot {
    pub rooms: BTreeMap<RoomId, BTreeSet<ConnectionId>>,
    pub connections: BTreeMap<ConnectionId, ConnectionSnapshot>,
}

impl HubSnapshot {
    /// Connections subscribed to `room_id` (empty if the room is unknown)
    pub fn members(&self, room_id: RoomId) -> BTreeSet<ConnectionId> {
        self.rooms.get(&room_id).cloned().unwrap_or_default()
    }

    pub fn contains_connection(&self, connection_id: ConnectionId) -> bool {
        self.connections.contains_key(&connection_id)
    }

    /// Checks that both membership directions agree:
    /// `C in members(R)` iff `R in rooms(C)`, and only known connections are members.
    pub fn is_consistent(&self) -> bool {
        let forward = self.rooms.iter().all(|(room_id, members)| {
            members.iter().all(|connection_id| {
                self.connections
                    .get(connection_id)
                    .is_some_and(|conn| conn.rooms.contains(room_id))
            })
        });
        let backward = self.connections.iter().all(|(connection_id, conn)| {
            conn.rooms.iter().all(|room_id| {
                self.rooms
                    .get(room_id)
                    .is_some_and(|members| members.contains(connection_id))
            })
        });
        forward && backward
    }
}
