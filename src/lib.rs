// Library Crate Root
// lib.rs

// main.rs imports through lib.rs like an external crate
pub mod api;
pub mod config;
pub mod database;
pub mod datasource;
pub mod jobs;
pub mod models;
pub mod sync;

// pub use = re-export at crate root
pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use datasource::{DatasetFetcher, TiingoClient};
pub use models::{ExchangeCode, SyncRun, SyncState};
pub use sync::{SyncError, SyncOrchestrator};
