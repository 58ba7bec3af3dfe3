use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::json_source::{FetchError, HttpJsonSource, JsonSource};
use crate::models::{DailyPrice, TickerMetadata};

/// Client for the Tiingo end-of-day API (live quote and metadata lookups)
pub struct TiingoClient {
    source: Arc<dyn JsonSource>,
    base_url: String,
}

impl TiingoClient {
    /// Client authenticating with `Authorization: Token <token>`
    pub fn new(token: &str, base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token {}", token))
            .map_err(|e| FetchError::Client(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let source = HttpJsonSource::with_headers(timeout, headers)?;

        Ok(Self::with_source(Arc::new(source), base_url))
    }

    pub fn with_source(source: Arc<dyn JsonSource>, base_url: impl Into<String>) -> Self {
        Self {
            source,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Name, description and listing dates for a ticker
    pub async fn ticker_metadata(&self, symbol: &str) -> Result<TickerMetadata, FetchError> {
        let url = format!("{}/tiingo/daily/{}", self.base_url, normalize(symbol));
        decode(self.source.fetch_json(&url).await?)
    }

    /// Daily price history, optionally bounded by dates
    pub async fn daily_prices(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<DailyPrice>, FetchError> {
        let mut params = Vec::new();
        if let Some(start) = start_date {
            params.push(format!("startDate={}", start.format("%Y-%m-%d")));
        }
        if let Some(end) = end_date {
            params.push(format!("endDate={}", end.format("%Y-%m-%d")));
        }

        let mut url = format!("{}/tiingo/daily/{}/prices", self.base_url, normalize(symbol));
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        match self.source.fetch_json(&url).await? {
            Value::Array(items) => items.into_iter().map(decode).collect(),
            // A single bar is sometimes returned bare
            single => Ok(vec![decode(single)?]),
        }
    }

    /// Most recent daily bar
    pub async fn latest_price(&self, symbol: &str) -> Result<DailyPrice, FetchError> {
        self.daily_prices(symbol, None, None)
            .await?
            .pop()
            .ok_or_else(|| FetchError::NotFound(format!("No price data available for ticker '{}'", normalize(symbol))))
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|e| FetchError::UnexpectedShape(e.to_string()))
}
