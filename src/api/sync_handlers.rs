use axum::{
    extract::{Path, State},
    Json,
};

use super::handlers::AppState;
use crate::models::{ExchangeSyncReport, FullSyncReport, SyncStatusReport};
use crate::sync::SyncError;

// Runs are spawned so a client that disconnects mid-request cannot drop the
// sync future halfway through an exchange.

/// Sync all exchanges (NASDAQ, NYSE, AMEX)
#[utoipa::path(
    post,
    path = "/api/v1/sync",
    tag = "Sync",
    responses(
        (status = 200, description = "Full sync completed", body = FullSyncReport),
        (status = 409, description = "A sync is already in progress", body = ErrorResponse),
        (status = 502, description = "Dataset fetch failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn start_full_sync(
    State(state): State<AppState>,
) -> Result<Json<FullSyncReport>, SyncError> {
    let orchestrator = state.orchestrator.clone();

    let report = tokio::spawn(async move { orchestrator.start_full_sync().await })
        .await
        .map_err(|e| SyncError::Internal(format!("sync task failed: {}", e)))??;

    Ok(Json(report))
}

/// Sync a single exchange
#[utoipa::path(
    post,
    path = "/api/v1/sync/{exchange}",
    tag = "Sync",
    params(
        ("exchange" = String, Path, description = "Exchange code: NASDAQ, NYSE or AMEX (case-insensitive)")
    ),
    responses(
        (status = 200, description = "Exchange sync completed", body = ExchangeSyncReport),
        (status = 400, description = "Unknown exchange code", body = ErrorResponse),
        (status = 409, description = "A sync is already in progress", body = ErrorResponse),
        (status = 502, description = "Dataset fetch failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn start_exchange_sync(
    State(state): State<AppState>,
    Path(exchange): Path<String>,
) -> Result<Json<ExchangeSyncReport>, SyncError> {
    let orchestrator = state.orchestrator.clone();

    let report = tokio::spawn(async move { orchestrator.start_exchange_sync(&exchange).await })
        .await
        .map_err(|e| SyncError::Internal(format!("sync task failed: {}", e)))??;

    Ok(Json(report))
}

/// Current (or last) sync run and the stored ticker count
#[utoipa::path(
    get,
    path = "/api/v1/sync/status",
    tag = "Sync",
    responses(
        (status = 200, description = "Sync status", body = SyncStatusReport)
    )
)]
pub async fn get_sync_status(State(state): State<AppState>) -> Json<SyncStatusReport> {
    Json(state.orchestrator.get_status().await)
}
