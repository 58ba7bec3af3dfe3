use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Point-in-time price observation for a ticker
///
/// Append-only: rows are never updated once written
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::ticker_price_snapshots)]
pub struct TickerPriceSnapshot {
    pub id: i64,
    pub ticker_id: i32,
    pub last_sale: Option<f64>,
    pub net_change: Option<f64>,
    /// Raw percentage number, "0.259%" is stored as 0.259
    pub pct_change: Option<f64>,
    pub volume: Option<i64>,
    pub market_cap: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// New snapshot for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::ticker_price_snapshots)]
pub struct NewTickerPriceSnapshot {
    pub ticker_id: i32,
    pub last_sale: Option<f64>,
    pub net_change: Option<f64>,
    pub pct_change: Option<f64>,
    pub volume: Option<i64>,
    pub market_cap: Option<f64>,
}

/// Parsed price fields of a raw record, not yet tied to a ticker row
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceObservation {
    pub last_sale: Option<f64>,
    pub net_change: Option<f64>,
    pub pct_change: Option<f64>,
    pub volume: Option<i64>,
    pub market_cap: Option<f64>,
}

impl PriceObservation {
    pub fn for_ticker(&self, ticker_id: i32) -> NewTickerPriceSnapshot {
        NewTickerPriceSnapshot {
            ticker_id,
            last_sale: self.last_sale,
            net_change: self.net_change,
            pct_change: self.pct_change,
            volume: self.volume,
            market_cap: self.market_cap,
        }
    }
}
