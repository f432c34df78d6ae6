//! HTTP response DTOs.

use serde::{Deserialize, Serialize};

use crate::hub::HubSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMembersDto {
    pub room_id: i64,
    pub connections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDto {
    pub connection_id: String,
    pub user_id: i64,
    pub username: String,
    pub state: String,
    pub rooms: Vec<i64>,
}

/// Debug view of the hub's membership state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubSnapshotDto {
    pub rooms: Vec<RoomMembersDto>,
    pub connections: Vec<ConnectionDto>,
}

impl From<HubSnapshot> for HubSnapshotDto {
    fn from(snapshot: HubSnapshot) -> Self {
        Self {
            rooms: snapshot
                .rooms
                .into_iter()
                .map(|(room_id, members)| RoomMembersDto {
                    room_id: room_id.value(),
                    connections: members.iter().map(|id| id.to_string()).collect(),
                })
                .collect(),
            connections: snapshot
                .connections
                .into_iter()
                .map(|(connection_id, conn)| ConnectionDto {
                    connection_id: connection_id.to_string(),
                    user_id: conn.identity.user_id.value(),
                    username: conn.identity.username,
                    state: conn.state.to_string(),
                    rooms: conn.rooms.iter().map(|room_id| room_id.value()).collect(),
                })
                .collect(),
        }
    }
}
