/// Ticker sync pipeline
///
/// - `parsing`: field parsers for the dataset's display strings
/// - `upsert_engine`: raw record -> ticker row + price snapshot
/// - `orchestrator`: single-flight full / per-exchange runs and status
/// - `queries`: read accessors over the synced tickers

pub mod errors;
pub mod orchestrator;
pub mod parsing;
pub mod queries;
pub mod upsert_engine;

pub use errors::SyncError;
pub use orchestrator::SyncOrchestrator;
pub use queries::{Page, DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT, MAX_LIST_LIMIT};
pub use upsert_engine::TickerUpsertEngine;
