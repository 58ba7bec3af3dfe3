use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::database::models::TickerView;
use crate::sync::SyncError;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub timestamp: DateTime<Utc>,
}

/// Paged ticker listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TickerListResponse {
    pub tickers: Vec<TickerView>,
    pub count: usize,
    pub limit: i64,
    pub offset: i64,
}

/// Exchange listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExchangeTickersResponse {
    pub exchange: String,
    pub tickers: Vec<TickerView>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TickerCountResponse {
    pub total_tickers: i64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PageParams {
    /// Maximum number of tickers to return (default 100, max 1000)
    pub limit: Option<i64>,
    /// Number of tickers to skip
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SearchParams {
    /// Substring of the symbol or company name
    pub q: String,
    /// Maximum number of matches (default 50)
    pub limit: Option<i64>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = match &self {
            SyncError::Conflict => StatusCode::CONFLICT,
            SyncError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SyncError::NotFound(_) => StatusCode::NOT_FOUND,
            SyncError::Upstream(_) => StatusCode::BAD_GATEWAY,
            SyncError::Storage(_) | SyncError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if !self.is_client_error() {
            tracing::error!("Request failed: {}", self);
        }

        let error_response = ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}
