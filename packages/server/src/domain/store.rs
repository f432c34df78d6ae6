//! Collaborator interfaces.
//!
//! 永続化層と認証層はハブの外側にある。ハブ（とその周辺のユースケース）は
//! ここで定義した trait にのみ依存し、具体的な実装は Infrastructure 層が提供する。

use async_trait::async_trait;

use super::{
    GroupId, Identity, MessageContent, PersistedMessage, RoomId, RoomInfo, StoreError, UserId,
};

/// Persistence collaborator.
///
/// Implementations must be safe to call concurrently from every connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Whether `user_id` belongs to the group owning the rooms it wants to join
    async fn is_member(&self, user_id: UserId, group_id: GroupId) -> Result<bool, StoreError>;

    /// Look up a room, mainly to learn which group owns it
    async fn resolve_room(&self, room_id: RoomId) -> Result<RoomInfo, StoreError>;

    /// Durably store a message and return its authoritative form
    async fn persist_message(
        &self,
        room_id: RoomId,
        author: Identity,
        content: MessageContent,
    ) -> Result<PersistedMessage, StoreError>;

    /// Best-effort update of the user's last activity record
    async fn touch_last_seen(&self, user_id: UserId) -> Result<(), StoreError>;
}

/// Identity/session collaborator: turns an opaque credential into an identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, credential: &str) -> Result<Identity, StoreError>;
}
