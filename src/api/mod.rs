pub mod handlers;
pub mod openapi;
pub mod quote_handlers;
pub mod responses;
pub mod routes;
pub mod sync_handlers;
pub mod ticker_handlers;

pub use handlers::AppState;
pub use openapi::ApiDocV1;
pub use quote_handlers::QuoteState;
pub use responses::*;
pub use routes::create_router;
