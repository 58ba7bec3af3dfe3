/// Cron jobs and scheduled tasks module
///
/// - Scheduled full ticker sync

pub mod ticker_sync_job;

pub use ticker_sync_job::TickerSyncJob;
