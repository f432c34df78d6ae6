//! Domain layer: value objects, entities, collaborator interfaces and errors.
//!
//! Nothing in here knows about WebSocket frames or the hub's task layout.

mod error;
mod message;
mod store;
mod value_object;

pub use error::{DomainError, StoreError};
pub use message::{Identity, PersistedMessage, RoomInfo};
#[cfg(test)]
pub use store::MockChatStore;
pub use store::{ChatStore, IdentityProvider};
pub use value_object::{
    ConnectionId, GroupId, MessageContent, MessageId, RoomId, Timestamp, UserId,
};
