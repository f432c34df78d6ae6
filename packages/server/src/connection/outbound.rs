//! Outbound loop: queue -> transport, plus periodic liveness probes.

use std::fmt::Display;

use axum::{
    body::Bytes,
    extract::ws::{Message, Utf8Bytes},
};
use futures_util::{Sink, SinkExt};
use thiserror::Error;
use tokio::{
    sync::mpsc,
    time::{Duration, Instant, MissedTickBehavior, interval_at, timeout},
};

use crate::{
    domain::ConnectionId,
    hub::{HubConfig, HubHandle},
};

/// Fatal outbound failures
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("write timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),
}

async fn write_frame<S>(
    sink: &mut S,
    frame: Message,
    deadline: Duration,
) -> Result<(), WriteError>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    match timeout(deadline, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(WriteError::Transport(e.to_string())),
        Err(_) => Err(WriteError::Timeout(deadline)),
    }
}

/// Drain `queue` onto `sink` until the hub closes the queue or a write fails.
///
/// A closed queue means the hub already removed this connection: buffered
/// messages are flushed, a close frame is sent and the loop ends. A failed
/// write asks the hub to remove the connection.
pub async fn write_loop<S>(
    mut sink: S,
    mut queue: mpsc::Receiver<Utf8Bytes>,
    hub: HubHandle,
    connection_id: ConnectionId,
    config: HubConfig,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    // Fires regardless of application writes: only the peer's answer refreshes liveness
    let mut probe = interval_at(Instant::now() + config.ping_interval, config.ping_interval);
    probe.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let result = loop {
        tokio::select! {
            next = queue.recv() => match next {
                Some(payload) => {
                    let frame = Message::Text(payload);
                    if let Err(e) = write_frame(&mut sink, frame, config.write_timeout).await {
                        break Err(e);
                    }
                }
                None => {
                    let _ = write_frame(&mut sink, Message::Close(None), config.write_timeout).await;
                    break Ok(());
                }
            },
            _ = probe.tick() => {
                tracing::trace!("Sending liveness probe to {}", connection_id);
                let frame = Message::Ping(Bytes::new());
                if let Err(e) = write_frame(&mut sink, frame, config.write_timeout).await {
                    break Err(e);
                }
            }
        }
    };

    match result {
        Ok(()) => tracing::debug!("Outbound queue of {} closed", connection_id),
        Err(e) => {
            tracing::error!("Outbound loop of {} failed: {}", connection_id, e);
            let _ = hub.remove(connection_id).await;
        }
    }
}
