//! Shared application state.

use std::sync::Arc;

use crate::{connection::ConnectionServices, domain::IdentityProvider};

/// Shared application state
pub struct AppState {
    /// IdentityProvider（接続時のトークン検証）
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// Hub と各 UseCase（接続ごとのループに渡す）
    pub connection_services: ConnectionServices,
}
