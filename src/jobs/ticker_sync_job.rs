use crate::models::FullSyncReport;
use crate::sync::{SyncError, SyncOrchestrator};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

/// Scheduled full ticker sync
///
/// Shares the orchestrator with the HTTP API, so a scheduled run and a
/// manual run never overlap.
pub struct TickerSyncJob {
    orchestrator: Arc<SyncOrchestrator>,
    schedule: String,
}

impl TickerSyncJob {
    /// `schedule` is a six-field cron expression (seconds first)
    pub fn new(orchestrator: Arc<SyncOrchestrator>, schedule: impl Into<String>) -> Self {
        Self {
            orchestrator,
            schedule: schedule.into(),
        }
    }

    /// Run a full sync; `Ok(None)` when another run holds the slot
    pub async fn run_now(&self) -> Result<Option<FullSyncReport>, SyncError> {
        tracing::info!("Starting scheduled ticker sync");

        match self.orchestrator.start_full_sync().await {
            Ok(report) => Ok(Some(report)),
            Err(SyncError::Conflict) => {
                tracing::info!("Scheduled ticker sync skipped: a sync is already in progress");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Register this job with the scheduler
    pub async fn register(self, scheduler: &JobScheduler) -> Result<(), Box<dyn std::error::Error>> {
        let schedule = self.schedule.clone();
        let job = Arc::new(self);

        let cron_job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
            let job = job.clone();

            Box::pin(async move {
                match job.run_now().await {
                    Ok(Some(report)) => tracing::debug!(
                        "Ticker sync job completed: {} processed",
                        report.summary.total_processed
                    ),
                    Ok(None) => {}
                    Err(e) => tracing::error!("Ticker sync job failed: {}", e),
                }
            })
        })?;

        scheduler.add(cron_job).await?;

        tracing::info!("Ticker sync job registered ({})", schedule);

        Ok(())
    }
}
