use chrono::Utc;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::errors::{run_blocking, SyncError};
use super::upsert_engine::TickerUpsertEngine;
use crate::database::repositories::TickerRepository;
use crate::datasource::DatasetFetcher;
use crate::models::{
    ExchangeCode, ExchangeSyncReport, ExchangeSyncResult, FullSyncReport, SyncRun, SyncStatusReport,
    SyncSummary,
};

/// Runs dataset syncs, one at a time, and publishes their progress
///
/// At most one run (full or single-exchange) is active per process. A
/// second start request while a run is active is rejected with
/// `SyncError::Conflict` and leaves the published status untouched.
pub struct SyncOrchestrator {
    fetcher: DatasetFetcher,
    engine: Arc<TickerUpsertEngine>,
    pub(super) repository: Arc<dyn TickerRepository>,
    running: Arc<AtomicBool>,
    status: RwLock<Arc<SyncRun>>,
}

impl SyncOrchestrator {
    pub fn new(fetcher: DatasetFetcher, repository: Arc<dyn TickerRepository>) -> Self {
        Self {
            fetcher,
            engine: Arc::new(TickerUpsertEngine::new(repository.clone())),
            repository,
            running: Arc::new(AtomicBool::new(false)),
            status: RwLock::new(Arc::new(SyncRun::idle())),
        }
    }

    /// Sync NASDAQ, NYSE and AMEX in that order
    ///
    /// Record-level failures are counted; a failed fetch aborts the run and
    /// marks it failed.
    pub async fn start_full_sync(&self) -> Result<FullSyncReport, SyncError> {
        let mut guard = self.begin()?;
        info!("Starting full ticker sync");

        let mut exchanges = Vec::with_capacity(ExchangeCode::ALL.len());
        for exchange in ExchangeCode::ALL {
            let outcome = self.sync_exchange(exchange, &guard.slot).await;
            match outcome {
                Ok(result) => exchanges.push(result),
                Err(e) => return Err(guard.fail(exchange, e)),
            }
        }

        let run = guard.complete();
        info!(
            "Full sync completed: {} processed, {} succeeded, {} failed",
            run.total_processed, run.total_success, run.total_errors
        );

        Ok(FullSyncReport {
            status: "completed".to_string(),
            message: "Full sync completed successfully".to_string(),
            exchanges,
            summary: SyncSummary::from(&*run),
            started_at: run.started_at,
            completed_at: run.completed_at,
        })
    }

    /// Sync a single exchange given its code (case-insensitive)
    ///
    /// Unknown codes are rejected before the single-flight check.
    pub async fn start_exchange_sync(&self, code: &str) -> Result<ExchangeSyncReport, SyncError> {
        let exchange = ExchangeCode::parse(code).ok_or_else(|| {
            SyncError::InvalidArgument(format!(
                "Invalid exchange: {}. Must be one of: {}",
                code.trim(),
                ExchangeCode::valid_codes()
            ))
        })?;

        let mut guard = self.begin()?;
        info!("Starting {} ticker sync", exchange);

        let outcome = self.sync_exchange(exchange, &guard.slot).await;
        let result = match outcome {
            Ok(result) => result,
            Err(e) => return Err(guard.fail(exchange, e)),
        };

        let run = guard.complete();
        info!(
            "{} sync completed: {} processed, {} succeeded, {} failed",
            exchange, result.total, result.success, result.errors
        );

        Ok(ExchangeSyncReport {
            status: "completed".to_string(),
            message: format!("{} sync completed successfully", exchange),
            exchange,
            total_processed: result.total,
            total_success: result.success,
            total_errors: result.errors,
            started_at: run.started_at,
            completed_at: run.completed_at,
        })
    }

    /// Current run snapshot plus the live ticker count
    ///
    /// A failing count degrades to `None` instead of failing the call.
    pub async fn get_status(&self) -> SyncStatusReport {
        let run = self.snapshot();
        let repository = self.repository.clone();

        let count = match run_blocking(move || Ok(repository.count()?)).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!("Could not count tickers for sync status: {}", e);
                None
            }
        };

        SyncStatusReport::new(&run, count)
    }

    /// Latest published run, never a partially applied one
    pub fn snapshot(&self) -> Arc<SyncRun> {
        self.status.read().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Fetch first, then write on the blocking pool; no storage connection
    /// is held while the download is in flight.
    ///
    /// The blocking task holds its own handle on the run slot, so a dropped
    /// run keeps the slot until its last write has finished.
    async fn sync_exchange(
        &self,
        exchange: ExchangeCode,
        slot: &Arc<RunSlot>,
    ) -> Result<ExchangeSyncResult, SyncError> {
        self.publish(|run| run.processing(exchange));
        info!("Syncing {} tickers", exchange);

        let records = self.fetcher.fetch_exchange(exchange).await?;
        info!("Fetched {} {} records", records.len(), exchange);

        let engine = self.engine.clone();
        let slot = slot.clone();
        let result = run_blocking(move || {
            let _slot = slot;
            Ok(engine.upsert_all(&records, exchange))
        })
        .await?;

        self.publish(|run| run.with_exchange_result(&result));
        info!(
            "{}: {} processed, {} succeeded, {} failed",
            exchange, result.total, result.success, result.errors
        );

        Ok(result)
    }

    /// Claim the slot and publish the fresh run under one status write lock,
    /// so readers never see a taken slot next to an idle snapshot
    fn begin(&self) -> Result<RunGuard<'_>, SyncError> {
        let mut status = self.status.write();

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            drop(status);
            warn!("Rejected sync request: a sync is already in progress");
            return Err(SyncError::Conflict);
        }

        *status = Arc::new(SyncRun::started(Utc::now()));

        Ok(RunGuard {
            orchestrator: self,
            slot: Arc::new(RunSlot(self.running.clone())),
            finished: false,
        })
    }

    fn publish(&self, transition: impl FnOnce(&SyncRun) -> SyncRun) -> Arc<SyncRun> {
        let mut slot = self.status.write();
        let next = Arc::new(transition(&slot));
        *slot = next.clone();
        next
    }
}

/// Owned claim on the single-flight slot; released when the last handle drops
struct RunSlot(Arc<AtomicBool>);

impl Drop for RunSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Holds the single-flight slot for the duration of a run
///
/// Dropping an unfinished guard (cancelled future, panic) marks the run
/// failed. The slot is released once no blocking write still holds it.
struct RunGuard<'a> {
    orchestrator: &'a SyncOrchestrator,
    slot: Arc<RunSlot>,
    finished: bool,
}

impl RunGuard<'_> {
    fn complete(&mut self) -> Arc<SyncRun> {
        self.finished = true;
        self.orchestrator.publish(|run| run.completed(Utc::now()))
    }

    fn fail(&mut self, exchange: ExchangeCode, err: SyncError) -> SyncError {
        let message = format!("Sync failed: {}: {}", exchange, err);
        error!("{}", message);

        self.finished = true;
        self.orchestrator
            .publish(|run| run.failed(message, Utc::now()));
        err
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Sync run ended without completing");
            self.orchestrator
                .publish(|run| run.failed("Sync aborted before completion".to_string(), Utc::now()));
        }
    }
}
