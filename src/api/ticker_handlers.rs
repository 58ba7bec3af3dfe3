use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::handlers::AppState;
use super::responses::{
    ExchangeTickersResponse, PageParams, SearchParams, TickerCountResponse, TickerListResponse,
};
use crate::database::models::{TickerPriceSnapshot, TickerView};
use crate::sync::{Page, SyncError, DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT};

/// List tickers ordered by symbol
#[utoipa::path(
    get,
    path = "/api/v1/tickers",
    tag = "Tickers",
    params(PageParams),
    responses(
        (status = 200, description = "Page of tickers", body = TickerListResponse),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn list_tickers(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<TickerListResponse>, SyncError> {
    let page = Page::new(params.limit, params.offset, DEFAULT_LIST_LIMIT)?;
    let tickers = state.orchestrator.list_tickers(page).await?;

    Ok(Json(TickerListResponse {
        count: tickers.len(),
        tickers,
        limit: page.limit,
        offset: page.offset,
    }))
}

/// Search tickers by symbol or company name
#[utoipa::path(
    get,
    path = "/api/v1/tickers/search",
    tag = "Tickers",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching tickers", body = Vec<TickerView>),
        (status = 400, description = "Empty query", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn search_tickers(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TickerView>>, SyncError> {
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    state
        .orchestrator
        .search_tickers(&params.q, limit)
        .await
        .map(Json)
}

/// Number of stored tickers
#[utoipa::path(
    get,
    path = "/api/v1/tickers/count",
    tag = "Tickers",
    responses(
        (status = 200, description = "Ticker count", body = TickerCountResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn count_tickers(
    State(state): State<AppState>,
) -> Result<Json<TickerCountResponse>, SyncError> {
    let total_tickers = state.orchestrator.count_tickers().await?;

    Ok(Json(TickerCountResponse { total_tickers }))
}

/// Get a ticker by symbol
#[utoipa::path(
    get,
    path = "/api/v1/tickers/{symbol}",
    tag = "Tickers",
    params(
        ("symbol" = String, Path, description = "Ticker symbol (e.g., AAPL)")
    ),
    responses(
        (status = 200, description = "Ticker details", body = TickerView),
        (status = 400, description = "Malformed symbol", body = ErrorResponse),
        (status = 404, description = "Ticker not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn get_ticker(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<TickerView>, SyncError> {
    state.orchestrator.get_ticker_by_symbol(&symbol).await.map(Json)
}

/// Latest stored price snapshot of a ticker
#[utoipa::path(
    get,
    path = "/api/v1/tickers/{symbol}/price",
    tag = "Tickers",
    params(
        ("symbol" = String, Path, description = "Ticker symbol (e.g., AAPL)")
    ),
    responses(
        (status = 200, description = "Latest snapshot", body = TickerPriceSnapshot),
        (status = 404, description = "No price data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn get_ticker_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<TickerPriceSnapshot>, SyncError> {
    state.orchestrator.latest_price(&symbol).await.map(Json)
}

/// List the tickers of one exchange
#[utoipa::path(
    get,
    path = "/api/v1/exchanges/{code}/tickers",
    tag = "Tickers",
    params(
        ("code" = String, Path, description = "Exchange code: NASDAQ, NYSE or AMEX"),
        PageParams
    ),
    responses(
        (status = 200, description = "Tickers of the exchange", body = ExchangeTickersResponse),
        (status = 400, description = "Unknown exchange code", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
pub async fn list_exchange_tickers(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<ExchangeTickersResponse>, SyncError> {
    let page = Page::new(params.limit, params.offset, DEFAULT_LIST_LIMIT)?;
    let tickers = state
        .orchestrator
        .list_tickers_by_exchange(&code, page)
        .await?;

    Ok(Json(ExchangeTickersResponse {
        exchange: code.trim().to_ascii_uppercase(),
        count: tickers.len(),
        tickers,
    }))
}
