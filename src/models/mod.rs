pub mod exchange;
pub mod quote;
pub mod raw_ticker;
pub mod sync_status;

pub use exchange::ExchangeCode;
pub use quote::{DailyPrice, TickerMetadata};
pub use raw_ticker::RawTickerRecord;
pub use sync_status::{
    ExchangeSyncReport, ExchangeSyncResult, FullSyncReport, SyncRun, SyncState, SyncStatusReport,
    SyncSummary,
};
