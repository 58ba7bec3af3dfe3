use utoipa::OpenApi;

use crate::api::responses::*;
use crate::api::{handlers, quote_handlers, sync_handlers, ticker_handlers};
use crate::database::models::{TickerPriceSnapshot, TickerView};
use crate::models::{
    DailyPrice, ExchangeCode, ExchangeSyncReport, ExchangeSyncResult, FullSyncReport, SyncState,
    SyncStatusReport, SyncSummary, TickerMetadata,
};

/// OpenAPI v1 specification
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ticker Sync API",
        version = "1.0.0",
        description = "Synchronizes NASDAQ, NYSE and AMEX ticker listings into a relational store and serves them over REST",
        license(
            name = "MIT"
        )
    ),
    paths(
        handlers::health_check,
        sync_handlers::start_full_sync,
        sync_handlers::start_exchange_sync,
        sync_handlers::get_sync_status,
        ticker_handlers::list_tickers,
        ticker_handlers::search_tickers,
        ticker_handlers::count_tickers,
        ticker_handlers::get_ticker,
        ticker_handlers::get_ticker_price,
        ticker_handlers::list_exchange_tickers,
        quote_handlers::get_quote_metadata,
        quote_handlers::get_latest_quote,
    ),
    components(
        schemas(
            ExchangeCode,
            SyncState,
            ExchangeSyncResult,
            SyncSummary,
            FullSyncReport,
            ExchangeSyncReport,
            SyncStatusReport,
            TickerView,
            TickerPriceSnapshot,
            TickerMetadata,
            DailyPrice,
            HealthResponse,
            TickerListResponse,
            ExchangeTickersResponse,
            TickerCountResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Sync", description = "Dataset synchronization runs"),
        (name = "Tickers", description = "Stored ticker reads"),
        (name = "Quotes", description = "Live quote lookups (requires a Tiingo token)"),
    )
)]
pub struct ApiDocV1;
