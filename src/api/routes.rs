use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{health_check, AppState};
use super::openapi::ApiDocV1;
use super::quote_handlers::{get_latest_quote, get_quote_metadata, QuoteState};
use super::sync_handlers::*;
use super::ticker_handlers::*;

/// Create the API router with Swagger UI
///
/// Quote routes are only mounted when a Tiingo client is configured.
pub fn create_router(state: AppState, quotes: Option<QuoteState>) -> Router {
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/v1/openapi.json", ApiDocV1::openapi()))
        .route("/health", get(health_check))
        // Sync endpoints
        .route("/api/v1/sync", post(start_full_sync))
        .route("/api/v1/sync/status", get(get_sync_status))
        .route("/api/v1/sync/:exchange", post(start_exchange_sync))
        // Ticker endpoints
        .route("/api/v1/tickers", get(list_tickers))
        .route("/api/v1/tickers/search", get(search_tickers))
        .route("/api/v1/tickers/count", get(count_tickers))
        .route("/api/v1/tickers/:symbol", get(get_ticker))
        .route("/api/v1/tickers/:symbol/price", get(get_ticker_price))
        .route("/api/v1/exchanges/:code/tickers", get(list_exchange_tickers))
        .with_state(state);

    if let Some(client) = quotes {
        let quote_router = Router::new()
            .route("/api/v1/quotes/:symbol/metadata", get(get_quote_metadata))
            .route("/api/v1/quotes/:symbol/latest", get(get_latest_quote))
            .with_state(client);

        router.merge(quote_router)
    } else {
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::TickerUpsert;
    use crate::database::repositories::{InMemoryTickerRepository, TickerRepository};
    use crate::datasource::{DatasetFetcher, FetchError, JsonSource};
    use crate::models::ExchangeCode;
    use crate::sync::SyncOrchestrator;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct OneRecordSource;

    #[async_trait]
    impl JsonSource for OneRecordSource {
        async fn fetch_json(&self, _url: &str) -> Result<Value, FetchError> {
            Ok(json!([{"symbol": "AAPL", "name": "Apple Inc.", "lastsale": "$227.52"}]))
        }
    }

    fn app() -> Router {
        let repo = Arc::new(InMemoryTickerRepository::new());
        repo.upsert(&TickerUpsert::new("IBM", ExchangeCode::Nyse).with_name("IBM"))
            .unwrap();
        let fetcher = DatasetFetcher::new(Arc::new(OneRecordSource), "https://example.test");
        let state = AppState {
            orchestrator: Arc::new(SyncOrchestrator::new(fetcher, repo)),
            storage: "memory",
        };
        create_router(state, None)
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn test_exchange_sync_route() {
        let app = app();

        let (status, body) = send(app.clone(), "POST", "/api/v1/sync/nasdaq").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["exchange"], "NASDAQ");
        assert_eq!(body["total_success"], 1);

        let (status, body) = send(app.clone(), "GET", "/api/v1/tickers/AAPL").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["exchange_code"], "NASDAQ");

        let (status, body) = send(app, "GET", "/api/v1/sync/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "completed");
        assert_eq!(body["total_tickers_in_db"], 2);
    }

    #[tokio::test]
    async fn test_invalid_exchange_is_bad_request() {
        let (status, body) = send(app(), "POST", "/api/v1/sync/LSE").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_argument");
    }

    #[tokio::test]
    async fn test_ticker_reads() {
        let app = app();

        let (status, body) = send(app.clone(), "GET", "/api/v1/tickers/count").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_tickers"], 1);

        let (status, body) = send(app.clone(), "GET", "/api/v1/tickers?limit=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["limit"], 10);

        let (status, body) = send(app.clone(), "GET", "/api/v1/exchanges/nyse/tickers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tickers"][0]["symbol"], "IBM");

        let (status, _) = send(app.clone(), "GET", "/api/v1/tickers/MSFT").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(app, "GET", "/api/v1/quotes/AAPL/latest").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
