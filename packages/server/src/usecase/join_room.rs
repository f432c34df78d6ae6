//! UseCase: ルーム参加処理
//!
//! ### 何をテストしているか
//! - グループのメンバーでなければ参加できない
//! - ルームが指定グループに属していなければ参加できない
//! - 認可に成功した場合のみ Hub にメンバーシップが作られる

use std::sync::Arc;

use crate::{
    domain::{ChatStore, ConnectionId, GroupId, Identity, RoomId},
    hub::HubHandle,
};

use super::error::JoinRoomError;

/// Authorize a connection for a room, then subscribe it through the hub.
pub struct JoinRoomUseCase {
    store: Arc<dyn ChatStore>,
    hub: HubHandle,
}

impl JoinRoomUseCase {
    pub fn new(store: Arc<dyn ChatStore>, hub: HubHandle) -> Self {
        Self { store, hub }
    }

    /// # Arguments
    ///
    /// * `connection_id` - The connection asking to join
    /// * `identity` - Identity bound to that connection
    /// * `group_id` - Group the client claims owns the room
    /// * `room_id` - Room to subscribe to
    ///
    /// # Errors
    ///
    /// Fails closed: any authorization or collaborator failure leaves
    /// membership untouched.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        identity: &Identity,
        group_id: GroupId,
        room_id: RoomId,
    ) -> Result<(), JoinRoomError> {
        // 1. グループのメンバーか確認
        if !self.store.is_member(identity.user_id, group_id).await? {
            return Err(JoinRoomError::NotGroupMember(group_id));
        }

        // 2. ルームがそのグループに属しているか確認
        let room = self.store.resolve_room(room_id).await?;
        if room.group_id != group_id {
            return Err(JoinRoomError::RoomNotInGroup { room_id, group_id });
        }

        // 3. Hub にメンバーシップを追加
        self.hub.join(connection_id, room_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockChatStore, RoomInfo, StoreError, UserId},
        hub::{Hub, HubConfig},
    };
    use tokio::sync::mpsc;

    const GROUP: GroupId = GroupId::new(1);
    const ROOM: RoomId = RoomId::new(7);

    async fn admitted_connection(hub: &HubHandle) -> (ConnectionId, Identity) {
        // 配信は行わないので受信側は不要
        let (tx, _rx) = mpsc::channel(8);
        let id = ConnectionId::generate();
        let identity = Identity::new(UserId::new(1), "alice");
        hub.admit(id, identity.clone(), tx).await.unwrap();
        (id, identity)
    }

    fn room_in(group_id: GroupId) -> RoomInfo {
        RoomInfo {
            id: ROOM,
            group_id,
            name: "#general".to_string(),
        }
    }

    #[tokio::test]
    async fn test_join_room_success() {
        // テスト項目: 認可に成功するとルームに参加できる
        // given (前提条件):
        let hub = Hub::spawn(HubConfig::default());
        let (conn, identity) = admitted_connection(&hub).await;
        let mut store = MockChatStore::new();
        store
            .expect_is_member()
            .withf(|user, group| *user == UserId::new(1) && *group == GROUP)
            .times(1)
            .returning(|_, _| Ok(true));
        store
            .expect_resolve_room()
            .times(1)
            .returning(|_| Ok(room_in(GROUP)));
        let usecase = JoinRoomUseCase::new(Arc::new(store), hub.clone());

        // when (操作):
        let result = usecase.execute(conn, &identity, GROUP, ROOM).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert!(hub.is_member(conn, ROOM).await.unwrap());
    }

    #[tokio::test]
    async fn test_join_room_denied_for_non_member() {
        // テスト項目: グループのメンバーでなければ参加できず、ルーム解決も行われない
        // given (前提条件):
        let hub = Hub::spawn(HubConfig::default());
        let (conn, identity) = admitted_connection(&hub).await;
        let mut store = MockChatStore::new();
        store.expect_is_member().returning(|_, _| Ok(false));
        store.expect_resolve_room().times(0);
        let usecase = JoinRoomUseCase::new(Arc::new(store), hub.clone());

        // when (操作):
        let result = usecase.execute(conn, &identity, GROUP, ROOM).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinRoomError::NotGroupMember(GROUP)));
        assert!(!hub.is_member(conn, ROOM).await.unwrap());
    }

    #[tokio::test]
    async fn test_join_room_denied_when_room_in_other_group() {
        // テスト項目: ルームが別グループに属している場合は参加できない
        // given (前提条件):
        let hub = Hub::spawn(HubConfig::default());
        let (conn, identity) = admitted_connection(&hub).await;
        let mut store = MockChatStore::new();
        store.expect_is_member().returning(|_, _| Ok(true));
        store
            .expect_resolve_room()
            .returning(|_| Ok(room_in(GroupId::new(2))));
        let usecase = JoinRoomUseCase::new(Arc::new(store), hub.clone());

        // when (操作):
        let result = usecase.execute(conn, &identity, GROUP, ROOM).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinRoomError::RoomNotInGroup {
                room_id: ROOM,
                group_id: GROUP
            })
        );
        assert!(hub.snapshot().await.unwrap().members(ROOM).is_empty());
    }

    #[tokio::test]
    async fn test_join_room_abandoned_on_store_failure() {
        // テスト項目: 永続化層のエラー時はリトライせず参加処理を打ち切る
        // given (前提条件):
        let hub = Hub::spawn(HubConfig::default());
        let (conn, identity) = admitted_connection(&hub).await;
        let mut store = MockChatStore::new();
        store
            .expect_is_member()
            .times(1)
            .returning(|_, _| Err(StoreError::Unavailable("db down".to_string())));
        let usecase = JoinRoomUseCase::new(Arc::new(store), hub.clone());

        // when (操作):
        let result = usecase.execute(conn, &identity, GROUP, ROOM).await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinRoomError::Store(_))));
        assert!(!hub.is_member(conn, ROOM).await.unwrap());
    }
}
