//! Tunables for the hub and its connection loops.

use std::time::Duration;

/// Hub configuration.
///
/// `ping_interval` must stay below `liveness_timeout`, otherwise idle but
/// healthy connections get swept.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Capacity of each connection's outbound queue
    pub outbound_capacity: usize,
    /// Capacity of the hub command channel
    pub command_capacity: usize,
    /// How often the health sweep runs
    pub sweep_interval: Duration,
    /// Connections silent for longer than this are evicted by the sweep
    pub liveness_timeout: Duration,
    /// Idle time after which the outbound loop sends a liveness probe
    pub ping_interval: Duration,
    /// Deadline for a single transport write
    pub write_timeout: Duration,
    /// Largest inbound message accepted; anything bigger is fatal
    pub max_message_size: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 256,
            command_capacity: 1024,
            sweep_interval: Duration::from_secs(30),
            liveness_timeout: Duration::from_secs(60),
            ping_interval: Duration::from_secs(54),
            write_timeout: Duration::from_secs(10),
            max_message_size: 512,
        }
    }
}
