//! WebSocket message envelopes.
//!
//! Inbound: `{"type": "...", "data": {...}}` client commands.
//! Outbound: `{"type": "new_message", "data": {...}}` broadcasts.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{GroupId, PersistedMessage, RoomId};
use roomcast_shared::time::timestamp_to_rfc3339;

/// Why an inbound text frame could not be turned into a [`ClientCommand`].
///
/// Always transient: the frame is dropped and the connection carries on.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("invalid data for '{kind}': {source}")]
    InvalidData {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("binary frames are not supported")]
    UnsupportedFrame,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    r#type: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct JoinRoomData {
    #[serde(alias = "hall_id")]
    group_id: GroupId,
    room_id: RoomId,
}

#[derive(Debug, Deserialize)]
struct LeaveRoomData {
    room_id: RoomId,
}

#[derive(Debug, Deserialize)]
struct SendMessageData {
    room_id: RoomId,
    #[serde(default)]
    content: String,
}

/// Decoded client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    JoinRoom { group_id: GroupId, room_id: RoomId },
    LeaveRoom { room_id: RoomId },
    SendMessage { room_id: RoomId, content: String },
    Ping,
    /// Unrecognized `type`; logged and ignored
    Unknown(String),
}

impl ClientCommand {
    /// Decode one inbound text frame
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(ProtocolError::MalformedEnvelope)?;

        let command = match envelope.r#type.as_str() {
            "join_room" => {
                let data: JoinRoomData = parse_data("join_room", envelope.data)?;
                ClientCommand::JoinRoom {
                    group_id: data.group_id,
                    room_id: data.room_id,
                }
            }
            "leave_room" => {
                let data: LeaveRoomData = parse_data("leave_room", envelope.data)?;
                ClientCommand::LeaveRoom {
                    room_id: data.room_id,
                }
            }
            "send_message" => {
                let data: SendMessageData = parse_data("send_message", envelope.data)?;
                ClientCommand::SendMessage {
                    room_id: data.room_id,
                    content: data.content,
                }
            }
            "ping" => ClientCommand::Ping,
            _ => ClientCommand::Unknown(envelope.r#type),
        };
        Ok(command)
    }
}

fn parse_data<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    data: Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|source| ProtocolError::InvalidData { kind, source })
}

/// Persisted message as seen by subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    /// RFC 3339, UTC
    pub created_at: String,
}

impl From<&PersistedMessage> for MessageDto {
    fn from(message: &PersistedMessage) -> Self {
        Self {
            id: message.id.value(),
            room_id: message.room_id.value(),
            user_id: message.user_id.value(),
            username: message.username.clone(),
            content: message.content.clone(),
            created_at: timestamp_to_rfc3339(message.created_at.value()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastMessageData {
    pub message: MessageDto,
    pub room_id: i64,
}

/// Messages pushed to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    NewMessage(BroadcastMessageData),
}

impl ServerEvent {
    pub fn new_message(message: &PersistedMessage) -> Self {
        ServerEvent::NewMessage(BroadcastMessageData {
            message: message.into(),
            room_id: message.room_id.value(),
        })
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageId, Timestamp, UserId};

    #[test]
    fn test_decode_join_room() {
        // テスト項目: join_room コマンドがデコードされる
        // given (前提条件):
        let text = r#"{"type":"join_room","data":{"group_id":1,"room_id":7}}"#;

        // when (操作):
        let command = ClientCommand::decode(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            command,
            ClientCommand::JoinRoom {
                group_id: GroupId::new(1),
                room_id: RoomId::new(7),
            }
        );
    }

    #[test]
    fn test_decode_join_room_accepts_hall_id_alias() {
        // テスト項目: group_id の代わりに hall_id を使っても受け付ける
        // given (前提条件):
        let text = r#"{"type":"join_room","data":{"hall_id":3,"room_id":7}}"#;

        // when (操作):
        let command = ClientCommand::decode(text).unwrap();

        // then (期待する結果):
        assert!(matches!(
            command,
            ClientCommand::JoinRoom { group_id, .. } if group_id == GroupId::new(3)
        ));
    }

    #[test]
    fn test_decode_ping_without_data() {
        // テスト項目: data を持たない ping がデコードされる
        // given (前提条件):
        let text = r#"{"type":"ping"}"#;

        // when (操作):
        let command = ClientCommand::decode(text).unwrap();

        // then (期待する結果):
        assert_eq!(command, ClientCommand::Ping);
    }

    #[test]
    fn test_decode_unknown_type() {
        // テスト項目: 未知の type は Unknown としてデコードされる（エラーにはならない）
        // given (前提条件):
        let text = r#"{"type":"typing","data":{"room_id":7}}"#;

        // when (操作):
        let command = ClientCommand::decode(text).unwrap();

        // then (期待する結果):
        assert_eq!(command, ClientCommand::Unknown("typing".to_string()));
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        // テスト項目: JSON として不正な入力はエラーになる
        // given (前提条件):
        let text = "hello there";

        // when (操作):
        let result = ClientCommand::decode(text);

        // then (期待する結果):
        assert!(matches!(result, Err(ProtocolError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_decode_rejects_wrong_data_shape() {
        // テスト項目: data の形が type と合わない場合はエラーになる
        // given (前提条件):
        let text = r#"{"type":"send_message","data":{"room_id":"seven"}}"#;

        // when (操作):
        let result = ClientCommand::decode(text);

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidData {
                kind: "send_message",
                ..
            })
        ));
    }

    #[test]
    fn test_new_message_envelope_shape() {
        // テスト項目: new_message イベントが type / data 形式でエンコードされる
        // given (前提条件):
        let message = PersistedMessage {
            id: MessageId::new(12),
            room_id: RoomId::new(7),
            user_id: UserId::new(1),
            username: "alice".to_string(),
            content: "hi".to_string(),
            created_at: Timestamp::new(1672531200000),
        };

        // when (操作):
        let json = ServerEvent::new_message(&message).encode().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        // then (期待する結果):
        assert_eq!(value["type"], "new_message");
        assert_eq!(value["data"]["room_id"], 7);
        assert_eq!(value["data"]["message"]["id"], 12);
        assert_eq!(value["data"]["message"]["username"], "alice");
        assert_eq!(value["data"]["message"]["content"], "hi");
        assert_eq!(
            value["data"]["message"]["created_at"],
            "2023-01-01T00:00:00.000Z"
        );
    }
}
