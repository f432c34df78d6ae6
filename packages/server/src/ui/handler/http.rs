//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{infrastructure::dto::http::HubSnapshotDto, ui::state::AppState};

/// Debug endpoint exposing the hub's room index
pub async fn debug_hub_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HubSnapshotDto>, StatusCode> {
    match state.connection_services.hub.snapshot().await {
        Ok(snapshot) => Ok(Json(HubSnapshotDto::from(snapshot))),
        Err(e) => {
            tracing::error!("Failed to take hub snapshot: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
