/// Repository pattern implementations
///
/// - `TickerRepositoryImpl`: PostgreSQL via diesel + r2d2
/// - `InMemoryTickerRepository`: same contract, process-local storage

pub mod memory_repository;
pub mod ticker_repository;

pub use memory_repository::InMemoryTickerRepository;
pub use ticker_repository::{TickerRepository, TickerRepositoryImpl};
