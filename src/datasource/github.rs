use serde_json::Value;
use std::sync::Arc;

use super::json_source::{FetchError, JsonSource};
use crate::models::raw_ticker::json_type_name;
use crate::models::ExchangeCode;

/// Fetches the per-exchange ticker files of the public GitHub dataset
///
/// The dataset root is a versioned raw URL, e.g.
/// `https://raw.githubusercontent.com/<owner>/<repo>/<ref>`.
pub struct DatasetFetcher {
    source: Arc<dyn JsonSource>,
    base_url: String,
}

impl DatasetFetcher {
    pub fn new(source: Arc<dyn JsonSource>, base_url: impl Into<String>) -> Self {
        Self {
            source,
            base_url: base_url.into(),
        }
    }

    /// Full URL of a dataset file
    pub fn url_for(&self, dataset_path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            dataset_path.trim_start_matches('/')
        )
    }

    /// Fetch a dataset file; anything other than a JSON array is a shape error
    pub async fn fetch(&self, dataset_path: &str) -> Result<Vec<Value>, FetchError> {
        let url = self.url_for(dataset_path);
        tracing::debug!("Fetching dataset {}", url);

        match self.source.fetch_json(&url).await? {
            Value::Array(records) => Ok(records),
            other => Err(FetchError::UnexpectedShape(format!(
                "expected list, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Fetch the raw records of one exchange
    pub async fn fetch_exchange(&self, exchange: ExchangeCode) -> Result<Vec<Value>, FetchError> {
        self.fetch(exchange.dataset_path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    struct MockSource {
        payload: Value,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl JsonSource for MockSource {
        async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
            self.requested.lock().push(url.to_string());
            Ok(self.payload.clone())
        }
    }

    fn fetcher(payload: Value) -> (DatasetFetcher, Arc<MockSource>) {
        let source = Arc::new(MockSource {
            payload,
            requested: Mutex::new(Vec::new()),
        });
        let fetcher = DatasetFetcher::new(source.clone(), "https://example.test/data/main/");
        (fetcher, source)
    }

    #[tokio::test]
    async fn test_fetch_exchange_builds_url() {
        let (fetcher, source) = fetcher(json!([{"symbol": "AAPL"}, {"symbol": "MSFT"}]));

        let records = fetcher.fetch_exchange(ExchangeCode::Nyse).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            source.requested.lock().as_slice(),
            ["https://example.test/data/main/nyse/nyse_full_tickers.json"]
        );
    }

    #[tokio::test]
    async fn test_non_array_payload_is_shape_error() {
        let (fetcher, _) = fetcher(json!({"message": "rate limited"}));

        let err = fetcher.fetch_exchange(ExchangeCode::Nasdaq).await.unwrap_err();

        assert!(matches!(err, FetchError::UnexpectedShape(_)));
        assert_eq!(err.to_string(), "Unexpected payload: expected list, got object");
    }
}
