use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::datasource::{FetchError, TiingoClient};
use crate::models::{DailyPrice, TickerMetadata};
use crate::sync::parsing::normalize_symbol;
use crate::sync::SyncError;

/// Shared state for quote endpoints
pub type QuoteState = Arc<TiingoClient>;

fn quote_error(symbol: &str, err: FetchError) -> SyncError {
    match err {
        FetchError::NotFound(_) => SyncError::NotFound(format!("No quote data for {}", symbol)),
        other => SyncError::Upstream(other),
    }
}

/// Live ticker metadata from Tiingo
#[utoipa::path(
    get,
    path = "/api/v1/quotes/{symbol}/metadata",
    tag = "Quotes",
    params(
        ("symbol" = String, Path, description = "Ticker symbol (e.g., AAPL)")
    ),
    responses(
        (status = 200, description = "Ticker metadata", body = TickerMetadata),
        (status = 400, description = "Malformed symbol", body = ErrorResponse),
        (status = 404, description = "Unknown ticker", body = ErrorResponse),
        (status = 502, description = "Quote provider failure", body = ErrorResponse),
    )
)]
pub async fn get_quote_metadata(
    State(client): State<QuoteState>,
    Path(symbol): Path<String>,
) -> Result<Json<TickerMetadata>, SyncError> {
    let symbol = normalize_symbol(Some(&symbol))?;

    client
        .ticker_metadata(&symbol)
        .await
        .map(Json)
        .map_err(|e| quote_error(&symbol, e))
}

/// Most recent end-of-day bar from Tiingo
#[utoipa::path(
    get,
    path = "/api/v1/quotes/{symbol}/latest",
    tag = "Quotes",
    params(
        ("symbol" = String, Path, description = "Ticker symbol (e.g., AAPL)")
    ),
    responses(
        (status = 200, description = "Latest daily price", body = DailyPrice),
        (status = 400, description = "Malformed symbol", body = ErrorResponse),
        (status = 404, description = "No price data", body = ErrorResponse),
        (status = 502, description = "Quote provider failure", body = ErrorResponse),
    )
)]
pub async fn get_latest_quote(
    State(client): State<QuoteState>,
    Path(symbol): Path<String>,
) -> Result<Json<DailyPrice>, SyncError> {
    let symbol = normalize_symbol(Some(&symbol))?;

    client
        .latest_price(&symbol)
        .await
        .map(Json)
        .map_err(|e| quote_error(&symbol, e))
}
