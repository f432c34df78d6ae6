//! The broadcast hub.
//!
//! A single task owns every piece of shared state (connections, room index,
//! liveness). Everything else talks to it through [`HubHandle`], which turns
//! calls into [`HubCommand`]s on one bounded, ordered channel. Because
//! membership changes and broadcast fan-out are handled by the same loop, a
//! broadcast always sees a consistent membership snapshot.

mod actor;
mod command;
mod config;
mod entry;
mod handle;
mod health;
mod room_index;
mod snapshot;

pub use actor::Hub;
pub use command::{BroadcastEnvelope, HubCommand, OutboundQueue};
pub use config::HubConfig;
pub use entry::ConnectionState;
pub use handle::{HubError, HubHandle};
pub use snapshot::{ConnectionSnapshot, HubSnapshot};
