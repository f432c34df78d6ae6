//! Liveness sweep.

use std::collections::HashMap;

use tokio::{
    sync::mpsc::WeakSender,
    time::{Duration, Instant, MissedTickBehavior, interval_at},
};

use crate::domain::ConnectionId;

use super::{HubCommand, entry::ConnectionEntry};

/// Active connections whose last liveness is older than `timeout`.
pub(super) fn stale_connections(
    connections: &HashMap<ConnectionId, ConnectionEntry>,
    now: Instant,
    timeout: Duration,
) -> Vec<ConnectionId> {
    connections
        .iter()
        .filter(|(_, entry)| entry.is_active() && entry.is_stale(now, timeout))
        .map(|(id, _)| *id)
        .collect()
}

/// Feed a [`HubCommand::Sweep`] into the hub every `period`.
///
/// Holds only a weak sender, so the timer never keeps the hub alive on its own.
pub(super) fn spawn_sweep_timer(
    commands: WeakSender<HubCommand>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(commands) = commands.upgrade() else {
                break;
            };
            if commands.send(HubCommand::Sweep).await.is_err() {
                break;
            }
        }
        tracing::debug!("Health sweep timer stopped");
    })
}
