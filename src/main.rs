use std::sync::Arc;
use ticker_sync_api::database::repositories::{
    InMemoryTickerRepository, TickerRepository, TickerRepositoryImpl,
};
use ticker_sync_api::datasource::HttpJsonSource;
use ticker_sync_api::jobs::TickerSyncJob;
use ticker_sync_api::{create_router, AppConfig, AppState, DatasetFetcher, SyncOrchestrator, TiingoClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticker_sync_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    let (repository, storage) = initialize_repository(&config).await;

    let source = HttpJsonSource::new(config.fetch_timeout())?;
    let fetcher = DatasetFetcher::new(Arc::new(source), config.dataset_base_url.clone());
    let orchestrator = Arc::new(SyncOrchestrator::new(fetcher, repository));

    tracing::info!("Dataset source: {}", config.dataset_base_url);

    if let Some(schedule) = &config.sync_cron {
        initialize_cron_scheduler(orchestrator.clone(), schedule).await;
    }

    let quotes = initialize_quote_client(&config);

    let state = AppState {
        orchestrator,
        storage,
    };
    let app = create_router(state, quotes);

    let listener = tokio::net::TcpListener::bind(&config.server_addr).await?;
    let addr = &config.server_addr;

    tracing::info!("Ticker Sync API server running on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui", addr);
    tracing::info!("Start a full sync: POST http://{}/api/v1/sync", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// PostgreSQL repository when DATABASE_URL is set, otherwise in-memory storage
async fn initialize_repository(config: &AppConfig) -> (Arc<dyn TickerRepository>, &'static str) {
    use ticker_sync_api::database::establish_connection_pool;

    let Some(database_url) = config.database_url.clone() else {
        tracing::warn!("DATABASE_URL not set, tickers are kept in memory only");
        return (Arc::new(InMemoryTickerRepository::new()), "memory");
    };

    let settings = config.pool_settings();
    let run_migrations = config.run_migrations;

    // Pool creation and migrations block on network I/O
    let pool = tokio::task::spawn_blocking(move || {
        let pool = establish_connection_pool(&database_url, settings)?;
        if run_migrations {
            let applied = pool.run_migrations()?;
            tracing::info!("Applied {} pending migration(s)", applied);
        }
        Ok::<_, ticker_sync_api::database::DatabaseError>(pool)
    })
    .await;

    match pool {
        Ok(Ok(pool)) => {
            tracing::info!("Database integration complete");
            let repository = TickerRepositoryImpl::new(move || pool.get_conn());
            (Arc::new(repository), "postgres")
        }
        Ok(Err(e)) => {
            tracing::error!("Failed to initialize database: {}", e);
            tracing::warn!("Server will start with in-memory storage");
            (Arc::new(InMemoryTickerRepository::new()), "memory")
        }
        Err(e) => {
            tracing::error!("Database initialization task failed: {}", e);
            tracing::warn!("Server will start with in-memory storage");
            (Arc::new(InMemoryTickerRepository::new()), "memory")
        }
    }
}

/// Tiingo client for the quote endpoints, when a token is configured
fn initialize_quote_client(config: &AppConfig) -> Option<Arc<TiingoClient>> {
    let Some(token) = &config.tiingo_api_token else {
        tracing::info!("Quotes: Not configured (TIINGO_API_TOKEN not set)");
        return None;
    };

    match TiingoClient::new(token, config.tiingo_base_url.clone(), config.fetch_timeout()) {
        Ok(client) => {
            tracing::info!("Quotes: Tiingo client initialized ({})", config.tiingo_base_url);
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::error!("Failed to create Tiingo client: {}", e);
            None
        }
    }
}

/// Initialize cron scheduler for the scheduled full sync
async fn initialize_cron_scheduler(orchestrator: Arc<SyncOrchestrator>, schedule: &str) {
    use tokio_cron_scheduler::JobScheduler;

    tracing::info!("Initializing cron scheduler...");

    let scheduler = match JobScheduler::new().await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!("Failed to create cron scheduler: {}", e);
            return;
        }
    };

    if let Err(e) = TickerSyncJob::new(orchestrator, schedule).register(&scheduler).await {
        tracing::error!("Failed to register ticker sync job: {}", e);
        return;
    }

    if let Err(e) = scheduler.start().await {
        tracing::error!("Failed to start cron scheduler: {}", e);
        return;
    }

    tracing::info!("Cron scheduler started (full sync: {})", schedule);

    // Keep scheduler alive for the lifetime of the process
    std::mem::forget(scheduler);
}
