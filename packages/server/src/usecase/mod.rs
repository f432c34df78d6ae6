//! UseCase layer: the collaborator calls that precede a hub command.
//!
//! Authorization and persistence run in the calling connection's task so the
//! hub loop never waits on the persistence collaborator.

mod error;
mod join_room;
mod send_message;
mod touch_last_seen;

pub use error::{JoinRoomError, SendMessageError, TouchLastSeenError};
pub use join_room::JoinRoomUseCase;
pub use send_message::SendMessageUseCase;
pub use touch_last_seen::TouchLastSeenUseCase;
