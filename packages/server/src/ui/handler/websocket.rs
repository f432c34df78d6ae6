//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State, ws::WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{connection, ui::state::AppState};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

/// Authenticate the caller, then hand the upgraded socket to the hub.
///
/// A missing or unknown token is rejected before the upgrade.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(token) = query.token.filter(|token| !token.is_empty()) else {
        tracing::warn!("Rejecting WebSocket connection without token");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let identity = match state.identity_provider.resolve(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Rejecting WebSocket connection: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    let services = state.connection_services.clone();
    let max_message_size = services.config.max_message_size;
    tracing::info!("'{}' authenticated, upgrading connection", identity.username);

    // The transport limit sits above the hub's own limit so oversized frames
    // reach the inbound loop and close the connection there.
    Ok(ws
        .max_message_size(max_message_size.saturating_mul(2))
        .on_upgrade(move |socket| async move {
            connection::serve(socket, identity, services).await;
        }))
}
