//! UseCase 層のエラー型

use thiserror::Error;

use crate::{
    domain::{GroupId, RoomId, StoreError},
    hub::HubError,
};

/// join_room failures. None of these are reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("user is not a member of group {0}")]
    NotGroupMember(GroupId),

    #[error("room {room_id} does not belong to group {group_id}")]
    RoomNotInGroup { room_id: RoomId, group_id: GroupId },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Hub(#[from] HubError),
}

/// send_message failures. A failed message is never broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("message content is empty")]
    EmptyContent,

    #[error("connection is not subscribed to room {0}")]
    NotRoomMember(RoomId),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to encode broadcast: {0}")]
    Encode(String),

    #[error(transparent)]
    Hub(#[from] HubError),
}

/// ping failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TouchLastSeenError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Hub(#[from] HubError),
}
