//! Commands consumed by the hub loop.

use axum::extract::ws::Utf8Bytes;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{ConnectionId, Identity, RoomId};

use super::HubSnapshot;

/// Sending half of a connection's bounded outbound queue.
///
/// The hub holds the only sender; dropping it is how the outbound loop learns
/// that the connection was closed.
pub type OutboundQueue = mpsc::Sender<Utf8Bytes>;

/// An encoded message addressed to every current member of a room.
///
/// Built once per event; the payload is reference counted so fan-out clones
/// are cheap and never mutate it.
#[derive(Debug, Clone)]
pub struct BroadcastEnvelope {
    pub room_id: RoomId,
    pub payload: Utf8Bytes,
}

impl BroadcastEnvelope {
    pub fn new(room_id: RoomId, payload: impl Into<Utf8Bytes>) -> Self {
        Self {
            room_id,
            payload: payload.into(),
        }
    }
}

/// One step of the hub loop. Commands are applied strictly in arrival order.
#[derive(Debug)]
pub enum HubCommand {
    /// Register a newly established connection
    Admit {
        connection_id: ConnectionId,
        identity: Identity,
        queue: OutboundQueue,
    },
    /// Subscribe an (already authorized) connection to a room
    Join {
        connection_id: ConnectionId,
        room_id: RoomId,
    },
    /// Unsubscribe a connection from a room
    Leave {
        connection_id: ConnectionId,
        room_id: RoomId,
    },
    /// Fan an encoded message out to a room
    Broadcast(BroadcastEnvelope),
    /// Evict a connection from every room and close its queue
    Remove { connection_id: ConnectionId },
    /// Record inbound activity for a connection
    Touch { connection_id: ConnectionId },
    /// Ask whether a connection currently receives broadcasts for a room
    IsMember {
        connection_id: ConnectionId,
        room_id: RoomId,
        reply: oneshot::Sender<bool>,
    },
    /// Evict every connection that has not shown liveness in time
    Sweep,
    /// Capture the current membership state
    Snapshot { reply: oneshot::Sender<HubSnapshot> },
}
