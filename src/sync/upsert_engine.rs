use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::errors::SyncError;
use super::parsing::{
    non_blank, normalize_symbol, parse_decimal, parse_percentage, parse_price, parse_volume,
    parse_year,
};
use crate::database::models::{PriceObservation, Ticker, TickerUpsert};
use crate::database::repositories::TickerRepository;
use crate::models::{ExchangeCode, ExchangeSyncResult, RawTickerRecord};

/// Turns raw dataset records into ticker rows and price snapshots
///
/// A record either lands completely or not at all; one bad record never
/// stops the batch it belongs to.
pub struct TickerUpsertEngine {
    repository: Arc<dyn TickerRepository>,
}

impl TickerUpsertEngine {
    pub fn new(repository: Arc<dyn TickerRepository>) -> Self {
        Self { repository }
    }

    /// Normalize a raw record into a write request
    ///
    /// Only the symbol is mandatory. Price fields that fail to parse become
    /// `None`; a snapshot is attached only when `lastsale` is non-empty.
    pub fn normalize(
        record: &RawTickerRecord,
        exchange: ExchangeCode,
    ) -> Result<TickerUpsert, SyncError> {
        let symbol = normalize_symbol(record.symbol.as_deref())?;

        let price = non_blank(record.lastsale.as_deref()).map(|_| PriceObservation {
            last_sale: parse_price(record.lastsale.as_deref()),
            net_change: parse_decimal(record.netchange.as_deref()),
            pct_change: parse_percentage(record.pctchange.as_deref()),
            volume: parse_volume(record.volume.as_deref()),
            market_cap: parse_decimal(record.market_cap.as_deref()),
        });

        Ok(TickerUpsert {
            symbol,
            name: non_blank(record.name.as_deref()),
            exchange,
            sector: non_blank(record.sector.as_deref()),
            industry: non_blank(record.industry.as_deref()),
            country: non_blank(record.country.as_deref()),
            ipo_year: parse_year(record.ipoyear.as_deref()),
            source_url: non_blank(record.url.as_deref()),
            price,
        })
    }

    /// Write one record; failures are logged and reported as `false`
    pub fn upsert(&self, record: &RawTickerRecord, exchange: ExchangeCode) -> bool {
        match self.try_upsert(record, exchange) {
            Ok(ticker) => {
                debug!("Upserted {} on {} (id {})", ticker.symbol, exchange, ticker.id);
                true
            }
            Err(e) => {
                warn!(
                    "Failed to upsert ticker {} on {}: {}",
                    record.symbol_for_log(),
                    exchange,
                    e
                );
                false
            }
        }
    }

    /// Decode a raw JSON item and write it
    pub fn upsert_value(&self, value: &Value, exchange: ExchangeCode) -> bool {
        match RawTickerRecord::from_value(value) {
            Ok(record) => self.upsert(&record, exchange),
            Err(e) => {
                warn!("Skipping malformed record on {}: {}", exchange, e);
                false
            }
        }
    }

    /// Feed a fetched dataset through the engine, counting outcomes
    pub fn upsert_all(&self, records: &[Value], exchange: ExchangeCode) -> ExchangeSyncResult {
        let mut result = ExchangeSyncResult::new(exchange);

        for value in records {
            result.record(self.upsert_value(value, exchange));
        }

        result
    }

    fn try_upsert(
        &self,
        record: &RawTickerRecord,
        exchange: ExchangeCode,
    ) -> Result<Ticker, SyncError> {
        let upsert = Self::normalize(record, exchange)?;
        Ok(self.repository.upsert(&upsert)?)
    }
}
