//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 永続化 → ブロードキャストの順序
//!
//! ### なぜこのテストが必要か
//! - 永続化されていない（ID を持たない）メッセージが購読者に届いてはならない
//! - ルームに参加していないコネクションからの送信は永続化もされない
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者全員（送信者を含む）に new_message が届く
//! - 異常系：未参加ルームへの送信、空メッセージ、永続化失敗

use std::sync::Arc;

use crate::{
    domain::{ChatStore, ConnectionId, Identity, MessageContent, PersistedMessage, RoomId},
    hub::HubHandle,
    infrastructure::dto::websocket::ServerEvent,
};

use super::error::SendMessageError;

/// Persist a chat message, then broadcast the persisted form to the room.
pub struct SendMessageUseCase {
    store: Arc<dyn ChatStore>,
    hub: HubHandle,
}

impl SendMessageUseCase {
    pub fn new(store: Arc<dyn ChatStore>, hub: HubHandle) -> Self {
        Self { store, hub }
    }

    /// # Returns
    ///
    /// * `Ok(PersistedMessage)` - the message as stored and broadcast
    /// * `Err(SendMessageError)` - nothing was broadcast
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        identity: &Identity,
        room_id: RoomId,
        content: String,
    ) -> Result<PersistedMessage, SendMessageError> {
        let content =
            MessageContent::try_from(content).map_err(|_| SendMessageError::EmptyContent)?;

        // 1. 送信者がルームを購読しているか Hub に問い合わせる
        if !self.hub.is_member(connection_id, room_id).await? {
            return Err(SendMessageError::NotRoomMember(room_id));
        }

        // 2. 永続化（ID とタイムスタンプはここで確定する）
        let message = self
            .store
            .persist_message(room_id, identity.clone(), content)
            .await?;

        // 3. 永続化済みの内容をブロードキャスト
        let payload = ServerEvent::new_message(&message)
            .encode()
            .map_err(|e| SendMessageError::Encode(e.to_string()))?;
        self.hub.broadcast(room_id, payload).await?;

        tracing::debug!(
            "Message {} from '{}' broadcast to room {}",
            message.id,
            identity.username,
            room_id
        );
        Ok(message)
    }
}
