use std::time::Duration;

use crate::database::PoolSettings;

/// Service configuration, read from the environment (and `.env` via dotenvy)
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL URL; the in-memory repository is used when absent
    pub database_url: Option<String>,
    pub db_pool_max_size: u32,
    pub db_connection_timeout_secs: u64,
    pub db_statement_timeout_ms: u64,

    /// Versioned raw root of the ticker dataset
    pub dataset_base_url: String,

    pub fetch_timeout_secs: u64,

    /// Enables the quote endpoints
    pub tiingo_api_token: Option<String>,
    pub tiingo_base_url: String,

    /// Six-field cron expression for the scheduled full sync
    pub sync_cron: Option<String>,
    pub server_addr: String,
    pub run_migrations: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            db_pool_max_size: default_pool_size(),
            db_connection_timeout_secs: default_connection_timeout(),
            db_statement_timeout_ms: default_statement_timeout(),
            dataset_base_url: default_dataset_base_url(),
            fetch_timeout_secs: default_fetch_timeout(),
            tiingo_api_token: None,
            tiingo_base_url: default_tiingo_base_url(),
            sync_cron: None,
            server_addr: default_server_addr(),
            run_migrations: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset, blank or unparsable values fall
    /// back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        // Zero pool sizes and timeouts are rejected by r2d2/reqwest or disable the limit
        let positive = |key: &str| text(key).and_then(|v| v.parse::<u64>().ok()).filter(|v| *v > 0);
        let defaults = Self::default();

        Self {
            database_url: text("DATABASE_URL"),
            db_pool_max_size: positive("DB_POOL_MAX_SIZE")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(defaults.db_pool_max_size),
            db_connection_timeout_secs: positive("DB_CONNECTION_TIMEOUT_SECS")
                .unwrap_or(defaults.db_connection_timeout_secs),
            db_statement_timeout_ms: positive("DB_STATEMENT_TIMEOUT_MS")
                .unwrap_or(defaults.db_statement_timeout_ms),
            dataset_base_url: text("DATASET_BASE_URL").unwrap_or(defaults.dataset_base_url),
            fetch_timeout_secs: positive("FETCH_TIMEOUT_SECS").unwrap_or(defaults.fetch_timeout_secs),
            tiingo_api_token: text("TIINGO_API_TOKEN"),
            tiingo_base_url: text("TIINGO_BASE_URL").unwrap_or(defaults.tiingo_base_url),
            sync_cron: text("SYNC_CRON"),
            server_addr: text("SERVER_ADDR").unwrap_or(defaults.server_addr),
            run_migrations: text("RUN_MIGRATIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.run_migrations),
        }
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_size: self.db_pool_max_size,
            connection_timeout: Duration::from_secs(self.db_connection_timeout_secs),
            statement_timeout: Duration::from_millis(self.db_statement_timeout_ms),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn default_pool_size() -> u32 {
    20
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_statement_timeout() -> u64 {
    30_000
}

fn default_dataset_base_url() -> String {
    "https://raw.githubusercontent.com/rreichel3/US-Stock-Symbols/main".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_tiingo_base_url() -> String {
    "https://api.tiingo.com".to_string()
}

fn default_server_addr() -> String {
    "127.0.0.1:8725".to_string()
}
