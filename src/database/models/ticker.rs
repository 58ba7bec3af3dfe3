use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::price_snapshot::PriceObservation;
use crate::models::ExchangeCode;

/// Ticker entity - a tradable security keyed by its symbol
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = crate::database::schema::tickers)]
pub struct Ticker {
    pub id: i32,

    /// Uppercase symbol, unique and immutable after creation
    pub symbol: String,

    pub name: Option<String>,
    pub exchange_id: Option<i32>,
    pub sector_id: Option<i32>,
    pub industry_id: Option<i32>,
    pub country: Option<String>,
    pub ipo_year: Option<i32>,

    /// Dataset-provided page for the ticker
    pub source_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New ticker for insertion (also the overwrite set on conflict)
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::tickers)]
pub struct NewTicker<'a> {
    pub symbol: &'a str,
    pub name: Option<&'a str>,
    pub exchange_id: Option<i32>,
    pub sector_id: Option<i32>,
    pub industry_id: Option<i32>,
    pub country: Option<&'a str>,
    pub ipo_year: Option<i32>,
    pub source_url: Option<&'a str>,
}

/// A normalized dataset record, ready to be written
///
/// Dimension labels are still text; the repository resolves them to ids
/// inside the same transaction as the ticker write.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerUpsert {
    pub symbol: String,
    pub name: Option<String>,
    pub exchange: ExchangeCode,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub ipo_year: Option<i32>,
    pub source_url: Option<String>,
    /// Present when the record carried a non-empty last sale
    pub price: Option<PriceObservation>,
}

impl TickerUpsert {
    pub fn new(symbol: impl Into<String>, exchange: ExchangeCode) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            exchange,
            sector: None,
            industry: None,
            country: None,
            ipo_year: None,
            source_url: None,
            price: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_price(mut self, price: PriceObservation) -> Self {
        self.price = Some(price);
        self
    }

    pub(crate) fn as_new_ticker(
        &self,
        exchange_id: Option<i32>,
        sector_id: Option<i32>,
        industry_id: Option<i32>,
    ) -> NewTicker<'_> {
        NewTicker {
            symbol: &self.symbol,
            name: self.name.as_deref(),
            exchange_id,
            sector_id,
            industry_id,
            country: self.country.as_deref(),
            ipo_year: self.ipo_year,
            source_url: self.source_url.as_deref(),
        }
    }
}

/// Ticker with its dimensions resolved to labels, as served by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TickerView {
    pub id: i32,
    pub symbol: String,
    pub name: Option<String>,
    pub country: Option<String>,
    pub ipo_year: Option<i32>,
    pub source_url: Option<String>,
    pub exchange_code: Option<String>,
    pub exchange_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the ticker/exchange/sector/industry left join
pub(crate) type TickerJoinRow = (
    Ticker,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

impl From<TickerJoinRow> for TickerView {
    fn from((ticker, exchange_code, exchange_name, sector, industry): TickerJoinRow) -> Self {
        Self {
            id: ticker.id,
            symbol: ticker.symbol,
            name: ticker.name,
            country: ticker.country,
            ipo_year: ticker.ipo_year,
            source_url: ticker.source_url,
            exchange_code,
            exchange_name,
            sector,
            industry,
            created_at: ticker.created_at,
            updated_at: ticker.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_upsert_builder() {
        let upsert = TickerUpsert::new("AAPL", ExchangeCode::Nasdaq)
            .with_name("Apple Inc.")
            .with_sector("Technology")
            .with_industry("Computer Manufacturing");

        assert_eq!(upsert.symbol, "AAPL");
        assert_eq!(upsert.name.as_deref(), Some("Apple Inc."));
        assert_eq!(upsert.sector.as_deref(), Some("Technology"));
        assert_eq!(upsert.price, None);

        let new_ticker = upsert.as_new_ticker(Some(1), Some(2), None);
        assert_eq!(new_ticker.symbol, "AAPL");
        assert_eq!(new_ticker.exchange_id, Some(1));
        assert_eq!(new_ticker.industry_id, None);
    }
}
