use tracing::debug;

use super::errors::{run_blocking, SyncError};
use super::orchestrator::SyncOrchestrator;
use super::parsing::normalize_symbol;
use crate::database::models::{TickerPriceSnapshot, TickerView};
use crate::models::ExchangeCode;

pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 1000;
pub const DEFAULT_SEARCH_LIMIT: i64 = 50;

/// Resolved paging window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Missing values take defaults, limits are capped at `MAX_LIST_LIMIT`
    pub fn new(limit: Option<i64>, offset: Option<i64>, default_limit: i64) -> Result<Self, SyncError> {
        let limit = limit.unwrap_or(default_limit);
        let offset = offset.unwrap_or(0);

        if limit < 1 {
            return Err(SyncError::InvalidArgument(format!(
                "limit must be at least 1, got {}",
                limit
            )));
        }
        if offset < 0 {
            return Err(SyncError::InvalidArgument(format!(
                "offset must not be negative, got {}",
                offset
            )));
        }

        Ok(Self {
            limit: limit.min(MAX_LIST_LIMIT),
            offset,
        })
    }
}

/// Read accessors over the synced tickers
impl SyncOrchestrator {
    pub async fn list_tickers_by_exchange(
        &self,
        code: &str,
        page: Page,
    ) -> Result<Vec<TickerView>, SyncError> {
        let exchange = ExchangeCode::parse(code).ok_or_else(|| {
            SyncError::InvalidArgument(format!(
                "Invalid exchange: {}. Must be one of: {}",
                code.trim(),
                ExchangeCode::valid_codes()
            ))
        })?;

        let repository = self.repository.clone();
        run_blocking(move || Ok(repository.list_by_exchange(exchange, page.limit, page.offset)?))
            .await
    }

    pub async fn get_ticker_by_symbol(&self, symbol: &str) -> Result<TickerView, SyncError> {
        let symbol = normalize_symbol(Some(symbol))?;
        debug!("Looking up ticker {}", symbol);

        let repository = self.repository.clone();
        let lookup = symbol.clone();
        run_blocking(move || Ok(repository.find_by_symbol(&lookup)?))
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("Ticker {} not found", symbol)))
    }

    pub async fn count_tickers(&self) -> Result<i64, SyncError> {
        let repository = self.repository.clone();
        run_blocking(move || Ok(repository.count()?)).await
    }

    pub async fn list_tickers(&self, page: Page) -> Result<Vec<TickerView>, SyncError> {
        let repository = self.repository.clone();
        run_blocking(move || Ok(repository.list(page.limit, page.offset)?)).await
    }

    /// Case-insensitive substring match on symbol or name
    pub async fn search_tickers(&self, query: &str, limit: i64) -> Result<Vec<TickerView>, SyncError> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Err(SyncError::InvalidArgument(
                "search query must not be empty".to_string(),
            ));
        }
        let limit = Page::new(Some(limit), None, DEFAULT_SEARCH_LIMIT)?.limit;

        let repository = self.repository.clone();
        run_blocking(move || Ok(repository.search(&query, limit)?)).await
    }

    /// Most recent stored price snapshot for a ticker
    pub async fn latest_price(&self, symbol: &str) -> Result<TickerPriceSnapshot, SyncError> {
        let symbol = normalize_symbol(Some(symbol))?;

        let repository = self.repository.clone();
        let lookup = symbol.clone();
        run_blocking(move || Ok(repository.latest_price(&lookup)?))
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("No price data for {}", symbol)))
    }
}
