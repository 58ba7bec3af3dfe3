use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "ticker-sync-api/0.1.0";

/// Upstream (remote dataset / quote API) failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("Request failed: {0}")]
    Network(String),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Unexpected payload: {0}")]
    UnexpectedShape(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Narrow capability every remote backend implements: GET a URL, parse JSON
#[async_trait]
pub trait JsonSource: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// reqwest-backed `JsonSource` with a whole-request timeout
pub struct HttpJsonSource {
    client: reqwest::Client,
}

impl HttpJsonSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Self::with_headers(timeout, HeaderMap::new())
    }

    /// Client that sends `headers` (e.g. an API token) on every request
    pub fn with_headers(timeout: Duration, headers: HeaderMap) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl JsonSource for HttpJsonSource {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // raw.githubusercontent.com serves JSON as text/plain, so parse the body ourselves
        let body = response.text().await.map_err(|e| request_error(url, e))?;

        serde_json::from_str(&body).map_err(|e| FetchError::InvalidJson(e.to_string()))
    }
}

fn request_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Network(error.to_string())
    }
}
