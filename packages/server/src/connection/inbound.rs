//! Inbound loop: transport frames -> client commands -> hub.

use std::fmt::Display;

use axum::extract::ws::Message;
use futures_util::{Stream, StreamExt};

use crate::infrastructure::dto::websocket::{ClientCommand, ProtocolError};

use super::InboundContext;

/// Read frames until the transport fails or closes, then ask the hub to
/// remove this connection.
///
/// Malformed frames are logged and dropped. Oversized frames and transport
/// errors end the loop.
pub async fn read_loop<S, E>(mut stream: S, context: InboundContext)
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let connection_id = context.connection_id;
    let username = context.identity.username.clone();
    let max_message_size = context.services.config.max_message_size;

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("WebSocket error from '{}': {}", username, e);
                break;
            }
        };

        let size = match &frame {
            Message::Text(text) => text.as_str().len(),
            Message::Binary(bytes) => bytes.len(),
            _ => 0,
        };
        if size > max_message_size {
            tracing::warn!(
                "Closing '{}': message of {} bytes exceeds limit of {}",
                username,
                size,
                max_message_size
            );
            break;
        }

        if matches!(frame, Message::Close(_)) {
            tracing::info!("Client '{}' requested close", username);
            break;
        }

        // Any inbound frame, including probe responses, proves liveness
        if context.services.hub.touch(connection_id).await.is_err() {
            break;
        }

        match frame {
            Message::Text(text) => {
                tracing::debug!("Received text from '{}': {}", username, text.as_str());
                match ClientCommand::decode(text.as_str()) {
                    Ok(command) => dispatch(&context, command).await,
                    Err(e) => tracing::warn!("Dropping message from '{}': {}", username, e),
                }
            }
            Message::Binary(_) => {
                tracing::warn!(
                    "Dropping message from '{}': {}",
                    username,
                    ProtocolError::UnsupportedFrame
                );
            }
            Message::Ping(_) => tracing::debug!("Received ping from '{}'", username),
            Message::Pong(_) => tracing::debug!("Received pong from '{}'", username),
            Message::Close(_) => {}
        }
    }

    let _ = context.services.hub.remove(connection_id).await;
}

/// Run one decoded command. Failures never reach the client.
async fn dispatch(context: &InboundContext, command: ClientCommand) {
    let InboundContext {
        connection_id,
        identity,
        services,
    } = context;
    let connection_id = *connection_id;

    match command {
        ClientCommand::JoinRoom { group_id, room_id } => {
            if let Err(e) = services
                .join_room
                .execute(connection_id, identity, group_id, room_id)
                .await
            {
                tracing::warn!(
                    "'{}' denied access to room {} in group {}: {}",
                    identity.username,
                    room_id,
                    group_id,
                    e
                );
            }
        }
        ClientCommand::LeaveRoom { room_id } => {
            if let Err(e) = services.hub.leave(connection_id, room_id).await {
                tracing::warn!("Failed to leave room {}: {}", room_id, e);
            }
        }
        ClientCommand::SendMessage { room_id, content } => {
            if let Err(e) = services
                .send_message
                .execute(connection_id, identity, room_id, content)
                .await
            {
                tracing::warn!(
                    "Message from '{}' to room {} dropped: {}",
                    identity.username,
                    room_id,
                    e
                );
            }
        }
        ClientCommand::Ping => {
            if let Err(e) = services
                .touch_last_seen
                .execute(connection_id, identity.user_id)
                .await
            {
                tracing::warn!("Failed to record last seen for '{}': {}", identity.username, e);
            }
        }
        ClientCommand::Unknown(kind) => {
            tracing::warn!("Unknown message type from '{}': {}", identity.username, kind);
        }
    }
}
