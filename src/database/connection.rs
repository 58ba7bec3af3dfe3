use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::RunQueryDsl;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Type alias for PostgreSQL connection pool
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Type alias for pooled connection
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Shared handle to the bounded PostgreSQL pool
///
/// A checked-out connection goes back to the pool when the
/// `PgPooledConnection` is dropped, so every exit path releases it.
#[derive(Clone)]
pub struct DatabasePool {
    pool: Arc<PgPool>,
}

impl DatabasePool {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Get a connection from the pool
    pub fn get_conn(&self) -> Result<PgPooledConnection, DatabaseError> {
        self.pool
            .get()
            .map_err(|e| DatabaseError::ConnectionPoolError(e.to_string()))
    }

    /// Apply pending embedded migrations (creates tables and seeds exchanges)
    pub fn run_migrations(&self) -> Result<usize, DatabaseError> {
        let mut conn = self.get_conn()?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

        Ok(applied.len())
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    ConnectionPoolError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
}

/// Pool settings, see `AppConfig`
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_size: u32,
    pub connection_timeout: Duration,
    pub statement_timeout: Duration,
}

/// Sets `statement_timeout` on every new connection so no query blocks forever
#[derive(Debug, Clone, Copy)]
struct StatementTimeout(Duration);

impl CustomizeConnection<PgConnection, r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
        diesel::sql_query(format!("SET statement_timeout = {}", self.0.as_millis()))
            .execute(conn)
            .map(|_| ())
            .map_err(r2d2::Error::QueryError)
    }
}

/// Establish the connection pool
///
/// # Arguments
/// * `database_url` - PostgreSQL connection URL
/// * `settings` - Pool size and timeouts
///
/// # Returns
/// * `Result<DatabasePool, DatabaseError>` - Database pool or error
pub fn establish_connection_pool(
    database_url: &str,
    settings: PoolSettings,
) -> Result<DatabasePool, DatabaseError> {
    tracing::info!("Establishing database connection pool...");

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(settings.max_size)
        .connection_timeout(settings.connection_timeout)
        .connection_customizer(Box::new(StatementTimeout(settings.statement_timeout)))
        .build(manager)
        .map_err(|e| DatabaseError::ConnectionPoolError(e.to_string()))?;

    tracing::info!(
        "Database pool created with max size: {} (statement timeout {} ms)",
        settings.max_size,
        settings.statement_timeout.as_millis()
    );

    // Test connection
    let _ = pool
        .get()
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    tracing::info!("Database connection successful");

    Ok(DatabasePool::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_pool_creation() {
        // Requires an actual database; skipped when DATABASE_URL is unset
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };

        let settings = PoolSettings {
            max_size: 2,
            connection_timeout: Duration::from_secs(5),
            statement_timeout: Duration::from_secs(5),
        };

        let result = establish_connection_pool(&url, settings);
        assert!(result.is_ok(), "Failed to create database pool");
    }

    #[test]
    fn test_error_display() {
        let err = DatabaseError::ConnectionPoolError("timed out".to_string());
        assert_eq!(err.to_string(), "Connection pool error: timed out");
    }
}
