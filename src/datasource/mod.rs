//! Remote data sources
//!
//! Every backend sits behind the `JsonSource` capability; the dataset
//! fetcher and the Tiingo client only differ in URLs and headers.

pub mod github;
pub mod json_source;
pub mod tiingo;

pub use github::DatasetFetcher;
pub use json_source::{FetchError, HttpJsonSource, JsonSource};
pub use tiingo::TiingoClient;
