use crate::database::connection::DatabaseError;
use crate::database::dimension_resolver::{normalize_label, DimensionResolver};
use crate::database::models::{
    Exchange, Industry, Sector, Ticker, TickerPriceSnapshot, TickerUpsert, TickerView,
};
use crate::database::repositories::TickerRepository;
use crate::models::ExchangeCode;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// In-process storage with the same semantics as the PostgreSQL repository
///
/// Used when no `DATABASE_URL` is configured, and by tests. Every operation
/// holds one mutex for its whole duration, so an upsert is atomic.
pub struct InMemoryTickerRepository {
    store: Mutex<MemoryStore>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    exchanges: Vec<Exchange>,
    sectors: Vec<Sector>,
    industries: Vec<Industry>,
    /// Keyed by symbol, which keeps listings ordered
    tickers: BTreeMap<String, Ticker>,
    snapshots: Vec<TickerPriceSnapshot>,
    next_ticker_id: i32,
    next_snapshot_id: i64,
}

impl InMemoryTickerRepository {
    /// Create a repository with the three exchanges pre-seeded
    pub fn new() -> Self {
        let exchanges = ExchangeCode::ALL
            .iter()
            .enumerate()
            .map(|(i, code)| Exchange {
                id: i as i32 + 1,
                code: code.as_str().to_string(),
                name: code.display_name().to_string(),
            })
            .collect();

        Self {
            store: Mutex::new(MemoryStore {
                exchanges,
                next_ticker_id: 1,
                next_snapshot_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Number of sector rows
    pub fn sector_count(&self) -> usize {
        self.store.lock().sectors.len()
    }

    /// Number of industry rows
    pub fn industry_count(&self) -> usize {
        self.store.lock().industries.len()
    }

    /// Number of price snapshot rows
    pub fn snapshot_count(&self) -> usize {
        self.store.lock().snapshots.len()
    }
}

impl Default for InMemoryTickerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl DimensionResolver for MemoryStore {
    fn resolve_sector(&mut self, name: Option<&str>) -> Result<Option<i32>, DatabaseError> {
        let Some(name) = normalize_label(name) else {
            return Ok(None);
        };

        if let Some(sector) = self.sectors.iter().find(|s| s.name == name) {
            return Ok(Some(sector.id));
        }

        let id = self.sectors.len() as i32 + 1;
        self.sectors.push(Sector {
            id,
            name: name.to_string(),
        });

        Ok(Some(id))
    }

    fn resolve_industry(
        &mut self,
        name: Option<&str>,
        sector_id: Option<i32>,
    ) -> Result<Option<i32>, DatabaseError> {
        let Some(name) = normalize_label(name) else {
            return Ok(None);
        };

        if let Some(industry) = self.industries.iter().find(|i| i.name == name) {
            return Ok(Some(industry.id));
        }

        let id = self.industries.len() as i32 + 1;
        self.industries.push(Industry {
            id,
            name: name.to_string(),
            sector_id,
        });

        Ok(Some(id))
    }

    fn resolve_exchange(&mut self, code: &str) -> Result<Option<i32>, DatabaseError> {
        let code = code.trim().to_ascii_uppercase();

        Ok(self.exchanges.iter().find(|e| e.code == code).map(|e| e.id))
    }
}

impl MemoryStore {
    fn view(&self, ticker: &Ticker) -> TickerView {
        let exchange = ticker
            .exchange_id
            .and_then(|id| self.exchanges.iter().find(|e| e.id == id));
        let sector = ticker
            .sector_id
            .and_then(|id| self.sectors.iter().find(|s| s.id == id));
        let industry = ticker
            .industry_id
            .and_then(|id| self.industries.iter().find(|i| i.id == id));

        TickerView::from((
            ticker.clone(),
            exchange.map(|e| e.code.clone()),
            exchange.map(|e| e.name.clone()),
            sector.map(|s| s.name.clone()),
            industry.map(|i| i.name.clone()),
        ))
    }

    fn page<'a>(
        &self,
        tickers: impl Iterator<Item = &'a Ticker>,
        limit: i64,
        offset: i64,
    ) -> Vec<TickerView> {
        tickers
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|t| self.view(t))
            .collect()
    }
}

impl TickerRepository for InMemoryTickerRepository {
    fn upsert(&self, upsert: &TickerUpsert) -> Result<Ticker, DatabaseError> {
        let mut store = self.store.lock();

        let sector_id = store.resolve_sector(upsert.sector.as_deref())?;
        let industry_id = store.resolve_industry(upsert.industry.as_deref(), sector_id)?;
        let exchange_id = store.resolve_exchange(upsert.exchange.as_str())?;

        let now = Utc::now();
        let existing = store
            .tickers
            .get(&upsert.symbol)
            .map(|t| (t.id, t.created_at));
        let (id, created_at) = match existing {
            Some(existing) => existing,
            None => {
                let id = store.next_ticker_id;
                store.next_ticker_id += 1;
                (id, now)
            }
        };

        let ticker = Ticker {
            id,
            symbol: upsert.symbol.clone(),
            name: upsert.name.clone(),
            exchange_id,
            sector_id,
            industry_id,
            country: upsert.country.clone(),
            ipo_year: upsert.ipo_year,
            source_url: upsert.source_url.clone(),
            created_at,
            updated_at: now,
        };
        store.tickers.insert(ticker.symbol.clone(), ticker.clone());

        if let Some(price) = &upsert.price {
            let snapshot_id = store.next_snapshot_id;
            store.next_snapshot_id += 1;

            let new_snapshot = price.for_ticker(id);
            store.snapshots.push(TickerPriceSnapshot {
                id: snapshot_id,
                ticker_id: new_snapshot.ticker_id,
                last_sale: new_snapshot.last_sale,
                net_change: new_snapshot.net_change,
                pct_change: new_snapshot.pct_change,
                volume: new_snapshot.volume,
                market_cap: new_snapshot.market_cap,
                recorded_at: now,
            });
        }

        Ok(ticker)
    }

    fn find_by_symbol(&self, symbol: &str) -> Result<Option<TickerView>, DatabaseError> {
        let store = self.store.lock();

        Ok(store.tickers.get(symbol).map(|t| store.view(t)))
    }

    fn list_by_exchange(
        &self,
        exchange: ExchangeCode,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TickerView>, DatabaseError> {
        let store = self.store.lock();
        let exchange_id = store
            .exchanges
            .iter()
            .find(|e| e.code == exchange.as_str())
            .map(|e| e.id);

        let matching = store
            .tickers
            .values()
            .filter(|t| exchange_id.is_some() && t.exchange_id == exchange_id);

        Ok(store.page(matching, limit, offset))
    }

    fn list(&self, limit: i64, offset: i64) -> Result<Vec<TickerView>, DatabaseError> {
        let store = self.store.lock();

        Ok(store.page(store.tickers.values(), limit, offset))
    }

    fn search(&self, query: &str, limit: i64) -> Result<Vec<TickerView>, DatabaseError> {
        let store = self.store.lock();
        let needle = query.to_lowercase();

        let matching = store.tickers.values().filter(|t| {
            t.symbol.to_lowercase().contains(&needle)
                || t
                    .name
                    .as_ref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
        });

        Ok(store.page(matching, limit, 0))
    }

    fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.store.lock().tickers.len() as i64)
    }

    fn latest_price(&self, symbol: &str) -> Result<Option<TickerPriceSnapshot>, DatabaseError> {
        let store = self.store.lock();
        let Some(ticker) = store.tickers.get(symbol) else {
            return Ok(None);
        };

        // Snapshots are appended in order, so the last match is the newest
        Ok(store
            .snapshots
            .iter()
            .rev()
            .find(|s| s.ticker_id == ticker.id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::PriceObservation;

    #[test]
    fn test_sector_resolution_is_idempotent() {
        let mut store = MemoryStore::default();

        let first = store.resolve_sector(Some("Technology")).unwrap();
        let second = store.resolve_sector(Some("Technology")).unwrap();

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(store.sectors.len(), 1);
    }

    #[test]
    fn test_industry_keeps_first_sector() {
        let mut store = MemoryStore::default();

        let a = store.resolve_industry(Some("Banks"), Some(1)).unwrap();
        let b = store.resolve_industry(Some("Banks"), Some(2)).unwrap();

        assert_eq!(a, b);
        assert_eq!(store.industries.len(), 1);
        assert_eq!(store.industries[0].sector_id, Some(1));
    }

    #[test]
    fn test_blank_dimension_creates_nothing() {
        let mut store = MemoryStore::default();

        assert_eq!(store.resolve_sector(Some("   ")).unwrap(), None);
        assert_eq!(store.resolve_industry(Some(""), None).unwrap(), None);
        assert!(store.sectors.is_empty());
        assert!(store.industries.is_empty());
    }

    #[test]
    fn test_exchange_lookup_only() {
        let repo = InMemoryTickerRepository::new();
        let mut store = repo.store.lock();

        assert_eq!(store.resolve_exchange("nyse").unwrap(), Some(2));
        assert_eq!(store.resolve_exchange("LSE").unwrap(), None);
        assert_eq!(store.exchanges.len(), 3);
    }

    #[test]
    fn test_upsert_twice_keeps_one_row_and_last_values() {
        let repo = InMemoryTickerRepository::new();

        let first = repo
            .upsert(
                &TickerUpsert::new("AAPL", ExchangeCode::Nasdaq)
                    .with_name("Apple")
                    .with_sector("Technology"),
            )
            .unwrap();
        let second = repo
            .upsert(
                &TickerUpsert::new("AAPL", ExchangeCode::Nasdaq)
                    .with_name("Apple Inc.")
                    .with_sector("Technology"),
            )
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.sector_count(), 1);

        let view = repo.find_by_symbol("AAPL").unwrap().unwrap();
        assert_eq!(view.name.as_deref(), Some("Apple Inc."));
        assert_eq!(view.exchange_code.as_deref(), Some("NASDAQ"));
        assert_eq!(view.exchange_name.as_deref(), Some("Nasdaq Stock Market"));
        assert_eq!(view.sector.as_deref(), Some("Technology"));
    }

    #[test]
    fn test_snapshots_append_and_latest_wins() {
        let repo = InMemoryTickerRepository::new();
        let price = |last_sale| PriceObservation {
            last_sale: Some(last_sale),
            ..Default::default()
        };

        repo.upsert(&TickerUpsert::new("MSFT", ExchangeCode::Nasdaq).with_price(price(400.0)))
            .unwrap();
        repo.upsert(&TickerUpsert::new("MSFT", ExchangeCode::Nasdaq).with_price(price(401.5)))
            .unwrap();
        repo.upsert(&TickerUpsert::new("MSFT", ExchangeCode::Nasdaq))
            .unwrap();

        assert_eq!(repo.snapshot_count(), 2);
        let latest = repo.latest_price("MSFT").unwrap().unwrap();
        assert_eq!(latest.last_sale, Some(401.5));
        assert_eq!(repo.latest_price("NOPE").unwrap().map(|s| s.id), None);
    }

    #[test]
    fn test_listing_search_and_exchange_filter() {
        let repo = InMemoryTickerRepository::new();
        repo.upsert(&TickerUpsert::new("IBM", ExchangeCode::Nyse).with_name("International Business Machines"))
            .unwrap();
        repo.upsert(&TickerUpsert::new("AAPL", ExchangeCode::Nasdaq).with_name("Apple Inc."))
            .unwrap();
        repo.upsert(&TickerUpsert::new("AMZN", ExchangeCode::Nasdaq).with_name("Amazon.com"))
            .unwrap();

        let nasdaq: Vec<String> = repo
            .list_by_exchange(ExchangeCode::Nasdaq, 100, 0)
            .unwrap()
            .into_iter()
            .map(|t| t.symbol)
            .collect();
        assert_eq!(nasdaq, vec!["AAPL", "AMZN"]);
        assert!(repo.list_by_exchange(ExchangeCode::Amex, 100, 0).unwrap().is_empty());

        let page: Vec<String> = repo
            .list(1, 1)
            .unwrap()
            .into_iter()
            .map(|t| t.symbol)
            .collect();
        assert_eq!(page, vec!["AMZN"]);

        let found = repo.search("business", 10).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].symbol, "IBM");
        assert_eq!(repo.search("a", 10).unwrap().len(), 3);
    }

    #[test]
    fn test_search_wildcards_are_literal() {
        let repo = InMemoryTickerRepository::new();
        repo.upsert(&TickerUpsert::new("AB_C", ExchangeCode::Nasdaq).with_name("plain"))
            .unwrap();
        repo.upsert(&TickerUpsert::new("XYZ", ExchangeCode::Nasdaq).with_name("100 Percent"))
            .unwrap();

        let underscore: Vec<String> = repo
            .search("_", 10)
            .unwrap()
            .into_iter()
            .map(|t| t.symbol)
            .collect();
        assert_eq!(underscore, vec!["AB_C"]);
        assert!(repo.search("%", 10).unwrap().is_empty());
    }
}
