//! Entities handed between the hub and its collaborators.

use super::{GroupId, MessageId, RoomId, Timestamp, UserId};

/// Resolved identity of a connected participant.
///
/// Bound to a connection at admission time and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// Room record as known by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub id: RoomId,
    pub group_id: GroupId,
    pub name: String,
}

/// A message after the persistence collaborator accepted it.
///
/// `id` and `created_at` are authoritative; `content` is the canonical form
/// that gets broadcast, which may differ from what the client sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    pub created_at: Timestamp,
}
