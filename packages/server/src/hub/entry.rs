//! Hub-side record of one connection.

use std::{collections::HashSet, fmt};

use axum::extract::ws::Utf8Bytes;
use tokio::{
    sync::mpsc::error::TrySendError,
    time::{Duration, Instant},
};

use crate::domain::{Identity, RoomId};

use super::OutboundQueue;

/// Connection lifecycle.
///
/// `Connecting -> Active -> Closing -> Closed`; `Closing` is irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Active,
    Closing,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Active => "active",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Why the outbound queue refused a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EnqueueError {
    /// The consumer is too slow; the queue is at capacity
    Full,
    /// The outbound loop is gone
    Disconnected,
    /// The connection is no longer active
    NotActive,
}

/// Everything the hub tracks about a connection. Only the hub loop touches it.
#[derive(Debug)]
pub(super) struct ConnectionEntry {
    pub identity: Identity,
    pub rooms: HashSet<RoomId>,
    pub last_seen: Instant,
    state: ConnectionState,
    queue: Option<OutboundQueue>,
}

impl ConnectionEntry {
    pub fn new(identity: Identity, queue: OutboundQueue, now: Instant) -> Self {
        Self {
            identity,
            rooms: HashSet::new(),
            last_seen: now,
            state: ConnectionState::Connecting,
            queue: Some(queue),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn activate(&mut self) {
        if self.state == ConnectionState::Connecting {
            self.state = ConnectionState::Active;
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == ConnectionState::Active
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_seen = now;
    }

    /// Whether no liveness was observed for strictly longer than `timeout`
    pub fn is_stale(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > timeout
    }

    /// Push without waiting. Never blocks the hub on a slow consumer.
    pub fn try_enqueue(&self, payload: Utf8Bytes) -> Result<(), EnqueueError> {
        if !self.is_active() {
            return Err(EnqueueError::NotActive);
        }
        let Some(queue) = self.queue.as_ref() else {
            return Err(EnqueueError::NotActive);
        };
        queue.try_send(payload).map_err(|e| match e {
            TrySendError::Full(_) => EnqueueError::Full,
            TrySendError::Closed(_) => EnqueueError::Disconnected,
        })
    }

    /// Enter `Closing` and release the outbound queue, which lets the
    /// outbound loop flush what is buffered and stop.
    pub fn begin_close(&mut self) {
        self.state = ConnectionState::Closing;
        self.queue = None;
    }

    /// Final transition, valid once the entry is out of every room
    pub fn finish_close(&mut self) {
        debug_assert!(self.rooms.is_empty());
        self.state = ConnectionState::Closed;
    }
}
