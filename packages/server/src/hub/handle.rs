//! Cloneable front door to the hub loop.

use axum::extract::ws::Utf8Bytes;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{ConnectionId, Identity, RoomId};

use super::{BroadcastEnvelope, HubCommand, HubSnapshot, OutboundQueue};

/// The hub loop is no longer running
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("hub is not running")]
    Stopped,
}

/// Handle used by connections, use cases and HTTP handlers to reach the hub.
///
/// Every method enqueues exactly one [`HubCommand`]; the hub applies them in
/// the order they were enqueued.
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub(super) fn new(commands: mpsc::Sender<HubCommand>) -> Self {
        Self { commands }
    }

    async fn submit(&self, command: HubCommand) -> Result<(), HubError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| HubError::Stopped)
    }

    /// Register a connection. Admission never fails while the hub is running.
    pub async fn admit(
        &self,
        connection_id: ConnectionId,
        identity: Identity,
        queue: OutboundQueue,
    ) -> Result<(), HubError> {
        self.submit(HubCommand::Admit {
            connection_id,
            identity,
            queue,
        })
        .await
    }

    /// Subscribe a connection to a room.
    ///
    /// Callers are expected to have authorized the connection already.
    pub async fn join(&self, connection_id: ConnectionId, room_id: RoomId) -> Result<(), HubError> {
        self.submit(HubCommand::Join {
            connection_id,
            room_id,
        })
        .await
    }

    pub async fn leave(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
    ) -> Result<(), HubError> {
        self.submit(HubCommand::Leave {
            connection_id,
            room_id,
        })
        .await
    }

    pub async fn broadcast(
        &self,
        room_id: RoomId,
        payload: impl Into<Utf8Bytes>,
    ) -> Result<(), HubError> {
        self.submit(HubCommand::Broadcast(BroadcastEnvelope::new(room_id, payload)))
            .await
    }

    /// Evict a connection. Removing an unknown or already removed connection is a no-op.
    pub async fn remove(&self, connection_id: ConnectionId) -> Result<(), HubError> {
        self.submit(HubCommand::Remove { connection_id }).await
    }

    /// Record liveness for a connection
    pub async fn touch(&self, connection_id: ConnectionId) -> Result<(), HubError> {
        self.submit(HubCommand::Touch { connection_id }).await
    }

    pub async fn is_member(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
    ) -> Result<bool, HubError> {
        let (reply, response) = oneshot::channel();
        self.submit(HubCommand::IsMember {
            connection_id,
            room_id,
            reply,
        })
        .await?;
        response.await.map_err(|_| HubError::Stopped)
    }

    /// Run a health sweep now instead of waiting for the timer
    pub async fn sweep(&self) -> Result<(), HubError> {
        self.submit(HubCommand::Sweep).await
    }

    pub async fn snapshot(&self) -> Result<HubSnapshot, HubError> {
        let (reply, response) = oneshot::channel();
        self.submit(HubCommand::Snapshot { reply }).await?;
        response.await.map_err(|_| HubError::Stopped)
    }
}
