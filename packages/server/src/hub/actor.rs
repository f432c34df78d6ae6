//! The hub loop: sole owner and mutator of membership state.

use std::collections::HashMap;

use tokio::{sync::mpsc, time::Instant};

use crate::domain::{ConnectionId, Identity, RoomId};

use super::{
    BroadcastEnvelope, ConnectionSnapshot, HubCommand, HubConfig, HubHandle, HubSnapshot,
    OutboundQueue,
    entry::{ConnectionEntry, EnqueueError},
    health::{spawn_sweep_timer, stale_connections},
    room_index::RoomIndex,
};

/// Why a connection is being evicted (for logs)
#[derive(Debug, Clone, Copy)]
enum EvictReason {
    Requested,
    QueueFull,
    QueueClosed,
    LivenessTimeout,
}

/// Broadcast hub state. Lives inside its own task; see [`Hub::spawn`].
pub struct Hub {
    config: HubConfig,
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: RoomIndex,
    commands: mpsc::Receiver<HubCommand>,
}

impl Hub {
    /// Start the hub loop and its sweep timer, returning a handle to it.
    ///
    /// The loop runs until every [`HubHandle`] has been dropped.
    pub fn spawn(config: HubConfig) -> HubHandle {
        let (tx, rx) = mpsc::channel(config.command_capacity);
        spawn_sweep_timer(tx.downgrade(), config.sweep_interval);

        let hub = Hub {
            config,
            connections: HashMap::new(),
            rooms: RoomIndex::new(),
            commands: rx,
        };
        tokio::spawn(hub.run());

        HubHandle::new(tx)
    }

    async fn run(mut self) {
        tracing::info!("Hub started");
        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }
        tracing::info!(
            "Hub stopped with {} connection(s) still registered",
            self.connections.len()
        );
    }

    /// Apply one command. Never awaits, so no two commands interleave.
    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Admit {
                connection_id,
                identity,
                queue,
            } => self.admit(connection_id, identity, queue),
            HubCommand::Join {
                connection_id,
                room_id,
            } => self.join(connection_id, room_id),
            HubCommand::Leave {
                connection_id,
                room_id,
            } => self.leave(connection_id, room_id),
            HubCommand::Broadcast(envelope) => self.broadcast(envelope),
            HubCommand::Remove { connection_id } => {
                self.remove(connection_id, EvictReason::Requested)
            }
            HubCommand::Touch { connection_id } => {
                if let Some(entry) = self.connections.get_mut(&connection_id) {
                    entry.touch(Instant::now());
                }
            }
            HubCommand::IsMember {
                connection_id,
                room_id,
                reply,
            } => {
                // The asker may have given up; nothing to do then.
                let _ = reply.send(self.rooms.contains(room_id, connection_id));
            }
            HubCommand::Sweep => self.sweep(),
            HubCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn admit(&mut self, connection_id: ConnectionId, identity: Identity, queue: OutboundQueue) {
        if self.connections.contains_key(&connection_id) {
            tracing::warn!("Connection {} admitted twice, replacing it", connection_id);
            self.remove(connection_id, EvictReason::Requested);
        }

        let mut entry = ConnectionEntry::new(identity, queue, Instant::now());
        entry.activate();
        tracing::info!(
            "Connection {} admitted for '{}' (user {}), total={}",
            connection_id,
            entry.identity.username,
            entry.identity.user_id,
            self.connections.len() + 1
        );
        self.connections.insert(connection_id, entry);
    }

    fn join(&mut self, connection_id: ConnectionId, room_id: RoomId) {
        let Some(entry) = self.connections.get_mut(&connection_id) else {
            tracing::debug!(
                "Ignoring join of room {} for unknown connection {}",
                room_id,
                connection_id
            );
            return;
        };
        if !entry.is_active() {
            return;
        }

        let inserted = self.rooms.insert(room_id, connection_id);
        entry.rooms.insert(room_id);
        if inserted {
            tracing::info!("'{}' joined room {}", entry.identity.username, room_id);
        }
    }

    fn leave(&mut self, connection_id: ConnectionId, room_id: RoomId) {
        let Some(entry) = self.connections.get_mut(&connection_id) else {
            return;
        };
        let removed = self.rooms.remove(room_id, connection_id);
        entry.rooms.remove(&room_id);
        if removed {
            tracing::info!("'{}' left room {}", entry.identity.username, room_id);
        }
    }

    fn broadcast(&mut self, envelope: BroadcastEnvelope) {
        let Some(members) = self.rooms.members(envelope.room_id) else {
            tracing::debug!("Broadcast to empty room {} dropped", envelope.room_id);
            return;
        };

        let mut evicted = Vec::new();
        for connection_id in members {
            let Some(entry) = self.connections.get(connection_id) else {
                continue;
            };
            match entry.try_enqueue(envelope.payload.clone()) {
                Ok(()) => {}
                Err(EnqueueError::Full) => evicted.push((*connection_id, EvictReason::QueueFull)),
                Err(EnqueueError::Disconnected) => {
                    evicted.push((*connection_id, EvictReason::QueueClosed))
                }
                Err(EnqueueError::NotActive) => {}
            }
        }
        tracing::debug!(
            "Broadcast to room {} reached {} of {} member(s)",
            envelope.room_id,
            members.len() - evicted.len(),
            members.len()
        );

        for (connection_id, reason) in evicted {
            self.remove(connection_id, reason);
        }
    }

    /// Evict from every room and close the queue, all within this one step.
    fn remove(&mut self, connection_id: ConnectionId, reason: EvictReason) {
        let Some(mut entry) = self.connections.remove(&connection_id) else {
            return;
        };

        entry.begin_close();
        for room_id in entry.rooms.drain() {
            self.rooms.remove(room_id, connection_id);
        }
        entry.finish_close();

        match reason {
            EvictReason::Requested => tracing::info!(
                "Connection {} for '{}' removed, total={}",
                connection_id,
                entry.identity.username,
                self.connections.len()
            ),
            _ => tracing::warn!(
                "Connection {} for '{}' evicted ({:?}), total={}",
                connection_id,
                entry.identity.username,
                reason,
                self.connections.len()
            ),
        }
    }

    fn sweep(&mut self) {
        let stale = stale_connections(
            &self.connections,
            Instant::now(),
            self.config.liveness_timeout,
        );
        if !stale.is_empty() {
            tracing::info!("Health sweep evicting {} connection(s)", stale.len());
        }
        for connection_id in stale {
            self.remove(connection_id, EvictReason::LivenessTimeout);
        }
    }

    fn snapshot(&self) -> HubSnapshot {
        HubSnapshot {
            rooms: self
                .rooms
                .iter()
                .map(|(room_id, members)| (*room_id, members.iter().copied().collect()))
                .collect(),
            connections: self
                .connections
                .iter()
                .map(|(connection_id, entry)| {
                    (
                        *connection_id,
                        ConnectionSnapshot {
                            identity: entry.identity.clone(),
                            state: entry.state(),
                            rooms: entry.rooms.iter().copied().collect(),
                        },
                    )
                })
                .collect(),
        }
    }
}
