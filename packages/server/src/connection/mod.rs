//! Per-connection read and write loops.
//!
//! Each admitted connection runs two tasks. The inbound loop decodes client
//! commands and forwards them (through the use cases) to the hub. The outbound
//! loop drains the connection's bounded queue onto the transport and sends
//! liveness probes when idle. The queue is the only thing the two share.

mod inbound;
mod outbound;
#[cfg(test)]
mod testing;

use std::{fmt::Display, sync::Arc};

use axum::extract::ws::Message;
use futures_util::{Sink, Stream, StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, Identity},
    hub::{HubConfig, HubHandle},
    usecase::{JoinRoomUseCase, SendMessageUseCase, TouchLastSeenUseCase},
};

pub use inbound::read_loop;
pub use outbound::{WriteError, write_loop};

/// Shared services every connection needs besides its transport.
#[derive(Clone)]
pub struct ConnectionServices {
    pub hub: HubHandle,
    pub join_room: Arc<JoinRoomUseCase>,
    pub send_message: Arc<SendMessageUseCase>,
    pub touch_last_seen: Arc<TouchLastSeenUseCase>,
    pub config: HubConfig,
}

/// State owned by one connection's inbound loop
pub struct InboundContext {
    pub connection_id: ConnectionId,
    pub identity: Identity,
    pub services: ConnectionServices,
}

/// Admit an established transport session into the hub and run it to completion.
///
/// Returns once both loops have stopped and the connection has been removed
/// from the hub.
pub async fn serve<T, E>(
    socket: T,
    identity: Identity,
    services: ConnectionServices,
) -> ConnectionId
where
    T: Stream<Item = Result<Message, E>> + Sink<Message> + Send + 'static,
    E: Display + Send + 'static,
    <T as Sink<Message>>::Error: Display + Send,
{
    let connection_id = ConnectionId::generate();
    let hub = services.hub.clone();
    let config = services.config.clone();

    let (queue_tx, queue_rx) = mpsc::channel(config.outbound_capacity);
    if let Err(e) = hub.admit(connection_id, identity.clone(), queue_tx).await {
        tracing::error!("Failed to admit '{}': {}", identity.username, e);
        return connection_id;
    }

    let (sink, stream) = socket.split();
    let context = InboundContext {
        connection_id,
        identity,
        services,
    };

    let mut recv_task = tokio::spawn(read_loop(stream, context));
    let mut send_task = tokio::spawn(write_loop(
        sink,
        queue_rx,
        hub.clone(),
        connection_id,
        config.clone(),
    ));

    tokio::select! {
        // The inbound loop already asked for removal; the hub closes the queue
        // and the outbound loop stops after flushing it.
        _ = &mut recv_task => {
            if tokio::time::timeout(config.write_timeout, &mut send_task).await.is_err() {
                tracing::warn!("Outbound loop of {} did not drain in time", connection_id);
                send_task.abort();
            }
        }
        _ = &mut send_task => recv_task.abort(),
    };

    // Idempotent; covers the abort paths above.
    let _ = hub.remove(connection_id).await;
    tracing::debug!("Connection {} finished", connection_id);
    connection_id
}
