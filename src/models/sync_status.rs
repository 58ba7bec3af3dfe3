use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::exchange::ExchangeCode;

/// Lifecycle of a sync run: Idle -> Running -> Completed | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Immutable snapshot of the current (or last) sync run
///
/// Every transition produces a new value; the orchestrator publishes it by
/// swapping an `Arc`, so status readers never observe a half-updated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SyncRun {
    pub state: SyncState,
    pub is_running: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub current_exchange: Option<ExchangeCode>,
    pub total_processed: u64,
    pub total_success: u64,
    pub total_errors: u64,
    pub error_message: Option<String>,
}

impl SyncRun {
    /// No run has happened yet
    pub fn idle() -> Self {
        Self {
            state: SyncState::Idle,
            is_running: false,
            started_at: None,
            completed_at: None,
            current_exchange: None,
            total_processed: 0,
            total_success: 0,
            total_errors: 0,
            error_message: None,
        }
    }

    /// Fresh run with all counters reset
    pub fn started(at: DateTime<Utc>) -> Self {
        Self {
            state: SyncState::Running,
            is_running: true,
            started_at: Some(at),
            ..Self::idle()
        }
    }

    pub fn processing(&self, exchange: ExchangeCode) -> Self {
        Self {
            current_exchange: Some(exchange),
            ..self.clone()
        }
    }

    /// Fold one exchange's outcome into the cumulative totals
    pub fn with_exchange_result(&self, result: &ExchangeSyncResult) -> Self {
        Self {
            current_exchange: Some(result.exchange),
            total_processed: self.total_processed + result.total,
            total_success: self.total_success + result.success,
            total_errors: self.total_errors + result.errors,
            ..self.clone()
        }
    }

    pub fn completed(&self, at: DateTime<Utc>) -> Self {
        Self {
            state: SyncState::Completed,
            is_running: false,
            completed_at: Some(at),
            current_exchange: None,
            ..self.clone()
        }
    }

    pub fn failed(&self, message: String, at: DateTime<Utc>) -> Self {
        Self {
            state: SyncState::Failed,
            is_running: false,
            completed_at: Some(at),
            error_message: Some(message),
            ..self.clone()
        }
    }
}

impl Default for SyncRun {
    fn default() -> Self {
        Self::idle()
    }
}

/// Per-exchange outcome of feeding a dataset through the upsert engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExchangeSyncResult {
    pub exchange: ExchangeCode,
    pub total: u64,
    pub success: u64,
    pub errors: u64,
}

impl ExchangeSyncResult {
    pub fn new(exchange: ExchangeCode) -> Self {
        Self {
            exchange,
            total: 0,
            success: 0,
            errors: 0,
        }
    }

    pub fn record(&mut self, ok: bool) {
        self.total += 1;
        if ok {
            self.success += 1;
        } else {
            self.errors += 1;
        }
    }
}

/// Cumulative counters of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SyncSummary {
    pub total_processed: u64,
    pub total_success: u64,
    pub total_errors: u64,
}

impl From<&SyncRun> for SyncSummary {
    fn from(run: &SyncRun) -> Self {
        Self {
            total_processed: run.total_processed,
            total_success: run.total_success,
            total_errors: run.total_errors,
        }
    }
}

/// Result of a completed full sync
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FullSyncReport {
    pub status: String,
    pub message: String,
    pub exchanges: Vec<ExchangeSyncResult>,
    pub summary: SyncSummary,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Result of a completed single-exchange sync
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExchangeSyncReport {
    pub status: String,
    pub message: String,
    pub exchange: ExchangeCode,
    pub total_processed: u64,
    pub total_success: u64,
    pub total_errors: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Status endpoint payload: run snapshot plus the live ticker count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncStatusReport {
    pub state: SyncState,
    pub is_running: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub current_exchange: Option<ExchangeCode>,
    pub total_processed: u64,
    pub total_success: u64,
    pub total_errors: u64,
    pub error_message: Option<String>,
    /// None when the count could not be read from storage
    pub total_tickers_in_db: Option<i64>,
}

impl SyncStatusReport {
    pub fn new(run: &SyncRun, total_tickers_in_db: Option<i64>) -> Self {
        Self {
            state: run.state,
            is_running: run.is_running,
            started_at: run.started_at,
            completed_at: run.completed_at,
            current_exchange: run.current_exchange,
            total_processed: run.total_processed,
            total_success: run.total_success,
            total_errors: run.total_errors,
            error_message: run.error_message.clone(),
            total_tickers_in_db,
        }
    }
}
