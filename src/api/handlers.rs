use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use super::responses::HealthResponse;
use crate::sync::SyncOrchestrator;

/// Shared state for the sync and ticker endpoints
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SyncOrchestrator>,
    /// "postgres" or "memory"
    pub storage: &'static str,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage.to_string(),
        timestamp: Utc::now(),
    })
}
