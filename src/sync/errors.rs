//! Error taxonomy of the sync service and read accessors
//!
//! Per-record failures never surface here: the upsert engine logs and
//! counts them. These are the errors a caller of the service sees.

use thiserror::Error;

use crate::database::DatabaseError;
use crate::datasource::FetchError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A sync run is already in progress (single-flight)
    #[error("Sync already in progress")]
    Conflict,

    /// Unknown exchange code, malformed ticker symbol, bad paging values
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested ticker (or its data) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote fetch failed: network, HTTP status, bad JSON or payload shape
    #[error("Upstream failure: {0}")]
    Upstream(#[from] FetchError),

    /// Connection pool or query failure
    #[error("Storage failure: {0}")]
    Storage(#[from] DatabaseError),

    /// Unexpected failure inside the service (e.g. a panicked worker)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Returns true if the caller can fix the request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SyncError::Conflict | SyncError::InvalidArgument(_) | SyncError::NotFound(_)
        )
    }

    /// Short machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Conflict => "conflict",
            SyncError::InvalidArgument(_) => "invalid_argument",
            SyncError::NotFound(_) => "not_found",
            SyncError::Upstream(_) => "upstream_failure",
            SyncError::Storage(_) => "storage_failure",
            SyncError::Internal(_) => "internal_error",
        }
    }
}

/// Run synchronous (diesel) work on the blocking pool
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, SyncError>
where
    F: FnOnce() -> Result<T, SyncError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| SyncError::Internal(format!("blocking task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::InvalidArgument("Invalid exchange: LSE".to_string());
        assert_eq!(err.to_string(), "Invalid argument: Invalid exchange: LSE");

        let err = SyncError::from(FetchError::UnexpectedShape("expected list, got object".into()));
        assert_eq!(
            err.to_string(),
            "Upstream failure: Unexpected payload: expected list, got object"
        );
    }

    #[test]
    fn test_error_categories() {
        assert!(SyncError::Conflict.is_client_error());
        assert!(SyncError::NotFound("AAPL".into()).is_client_error());
        assert!(!SyncError::Internal("x".into()).is_client_error());
        assert_eq!(
            SyncError::from(DatabaseError::QueryError("x".into())).kind(),
            "storage_failure"
        );
    }

    #[tokio::test]
    async fn test_run_blocking_maps_panics() {
        let result: Result<(), SyncError> = run_blocking(|| panic!("worker died")).await;
        assert!(matches!(result, Err(SyncError::Internal(_))));

        let ok = run_blocking(|| Ok(42)).await.unwrap();
        assert_eq!(ok, 42);
    }
}
