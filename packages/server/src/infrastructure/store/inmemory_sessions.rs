//! インメモリ IdentityProvider 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{Identity, IdentityProvider, StoreError};

/// Opaque token -> identity map
#[derive(Default)]
pub struct InMemorySessions {
    sessions: Mutex<HashMap<String, Identity>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for `identity`
    pub async fn issue(&self, identity: Identity) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let mut sessions = self.sessions.lock().await;
        sessions.insert(token.clone(), identity);
        token
    }
}

#[async_trait]
impl IdentityProvider for InMemorySessions {
    async fn resolve(&self, credential: &str) -> Result<Identity, StoreError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(credential)
            .cloned()
            .ok_or(StoreError::InvalidCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    #[tokio::test]
    async fn test_issued_token_resolves_to_identity() {
        // テスト項目: 発行したトークンから同じ Identity が得られる
        // given (前提条件):
        let sessions = InMemorySessions::new();
        let identity = Identity::new(UserId::new(1), "alice");

        // when (操作):
        let token = sessions.issue(identity.clone()).await;

        // then (期待する結果):
        assert_eq!(sessions.resolve(&token).await, Ok(identity));
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        // テスト項目: 未知のトークンは InvalidCredential になる
        // given (前提条件):
        let sessions = InMemorySessions::new();
        sessions
            .issue(Identity::new(UserId::new(1), "alice"))
            .await;

        // when (操作):
        let result = sessions.resolve("nope").await;

        // then (期待する結果):
        assert_eq!(result, Err(StoreError::InvalidCredential));
    }
}
