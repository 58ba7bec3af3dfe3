pub mod dimension;
pub mod price_snapshot;
pub mod ticker;

pub use dimension::{Exchange, Industry, NewIndustry, NewSector, Sector};
pub use price_snapshot::{NewTickerPriceSnapshot, PriceObservation, TickerPriceSnapshot};
pub use ticker::{NewTicker, Ticker, TickerUpsert, TickerView};
