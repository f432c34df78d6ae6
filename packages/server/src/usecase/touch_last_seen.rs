//! UseCase: アプリケーションレベルの ping 処理

use std::sync::Arc;

use crate::{
    domain::{ChatStore, ConnectionId, UserId},
    hub::HubHandle,
};

use super::error::TouchLastSeenError;

/// Refresh a connection's liveness and the user's external last-seen record.
pub struct TouchLastSeenUseCase {
    store: Arc<dyn ChatStore>,
    hub: HubHandle,
}

impl TouchLastSeenUseCase {
    pub fn new(store: Arc<dyn ChatStore>, hub: HubHandle) -> Self {
        Self { store, hub }
    }

    /// Liveness is refreshed even when the store update fails.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        user_id: UserId,
    ) -> Result<(), TouchLastSeenError> {
        self.hub.touch(connection_id).await?;
        self.store.touch_last_seen(user_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Identity, MockChatStore, StoreError},
        hub::{Hub, HubConfig},
    };
    use tokio::{sync::mpsc, time::Duration};

    #[tokio::test(start_paused = true)]
    async fn test_ping_refreshes_liveness_even_if_store_fails() {
        // テスト項目: last_seen の更新に失敗しても liveness は更新される
        // given (前提条件):
        let hub = Hub::spawn(HubConfig::default());
        let (tx, _rx) = mpsc::channel(8);
        let conn = ConnectionId::generate();
        hub.admit(conn, Identity::new(UserId::new(1), "alice"), tx)
            .await
            .unwrap();
        hub.snapshot().await.unwrap();
        let mut store = MockChatStore::new();
        store
            .expect_touch_last_seen()
            .withf(|user| *user == UserId::new(1))
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("db down".to_string())));
        let usecase = TouchLastSeenUseCase::new(Arc::new(store), hub.clone());

        // when (操作):
        tokio::time::advance(Duration::from_secs(50)).await;
        let result = usecase.execute(conn, UserId::new(1)).await;
        hub.snapshot().await.unwrap();
        tokio::time::advance(Duration::from_secs(50)).await;
        hub.sweep().await.unwrap();

        // then (期待する結果):
        assert!(matches!(result, Err(TouchLastSeenError::Store(_))));
        assert!(hub.snapshot().await.unwrap().contains_connection(conn));
    }
}
