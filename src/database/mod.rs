/// Database module for PostgreSQL integration
///
/// This module provides:
/// - Connection pooling with per-statement timeouts
/// - Dimension (sector/industry/exchange) resolution
/// - Repository implementations for tickers and price snapshots
/// - Database models and schema
/// - Diesel ORM integration and embedded migrations

pub mod connection;
pub mod dimension_resolver;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::{establish_connection_pool, DatabaseError, DatabasePool, PoolSettings};
pub use dimension_resolver::DimensionResolver;
