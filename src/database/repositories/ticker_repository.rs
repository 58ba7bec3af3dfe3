use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::dimension_resolver::DimensionResolver;
use crate::database::models::{Ticker, TickerPriceSnapshot, TickerUpsert, TickerView};
use crate::database::schema::{exchanges, industries, sectors, ticker_price_snapshots, tickers};
use crate::models::ExchangeCode;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use std::sync::Arc;

/// Ticker repository trait - the storage seam of the sync pipeline
///
/// Implementations must make `upsert` atomic: dimension resolution, the
/// ticker write and the price snapshot either all land or none do.
pub trait TickerRepository: Send + Sync {
    /// Resolve dimensions, insert-or-update the ticker by symbol and append
    /// a price snapshot when the upsert carries one
    fn upsert(&self, upsert: &TickerUpsert) -> Result<Ticker, DatabaseError>;

    /// Find ticker by (normalized, uppercase) symbol
    fn find_by_symbol(&self, symbol: &str) -> Result<Option<TickerView>, DatabaseError>;

    /// Tickers listed on an exchange, ordered by symbol
    fn list_by_exchange(
        &self,
        exchange: ExchangeCode,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TickerView>, DatabaseError>;

    /// All tickers, ordered by symbol
    fn list(&self, limit: i64, offset: i64) -> Result<Vec<TickerView>, DatabaseError>;

    /// Case-insensitive substring match on symbol or name
    fn search(&self, query: &str, limit: i64) -> Result<Vec<TickerView>, DatabaseError>;

    /// Total number of ticker rows
    fn count(&self) -> Result<i64, DatabaseError>;

    /// Most recent price snapshot for a symbol
    fn latest_price(&self, symbol: &str) -> Result<Option<TickerPriceSnapshot>, DatabaseError>;
}

/// Concrete implementation of TickerRepository backed by PostgreSQL
pub struct TickerRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl TickerRepositoryImpl {
    /// Create new ticker repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

// Left join of a ticker onto its three dimensions, selecting `TickerJoinRow`
macro_rules! ticker_view_query {
    () => {
        tickers::table
            .left_join(exchanges::table.on(tickers::exchange_id.eq(exchanges::id.nullable())))
            .left_join(sectors::table.on(tickers::sector_id.eq(sectors::id.nullable())))
            .left_join(industries::table.on(tickers::industry_id.eq(industries::id.nullable())))
            .select((
                tickers::all_columns,
                exchanges::code.nullable(),
                exchanges::name.nullable(),
                sectors::name.nullable(),
                industries::name.nullable(),
            ))
    };
}

impl TickerRepository for TickerRepositoryImpl {
    fn upsert(&self, upsert: &TickerUpsert) -> Result<Ticker, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        conn.transaction::<_, DatabaseError, _>(|conn| {
            let sector_id = conn.resolve_sector(upsert.sector.as_deref())?;
            let industry_id = conn.resolve_industry(upsert.industry.as_deref(), sector_id)?;
            let exchange_id = conn.resolve_exchange(upsert.exchange.as_str())?;

            let new_ticker = upsert.as_new_ticker(exchange_id, sector_id, industry_id);

            let ticker = diesel::insert_into(tickers::table)
                .values(&new_ticker)
                .on_conflict(tickers::symbol)
                .do_update()
                .set((
                    tickers::name.eq(excluded(tickers::name)),
                    tickers::exchange_id.eq(excluded(tickers::exchange_id)),
                    tickers::industry_id.eq(excluded(tickers::industry_id)),
                    tickers::sector_id.eq(excluded(tickers::sector_id)),
                    tickers::country.eq(excluded(tickers::country)),
                    tickers::ipo_year.eq(excluded(tickers::ipo_year)),
                    tickers::source_url.eq(excluded(tickers::source_url)),
                    tickers::updated_at.eq(Utc::now()),
                ))
                .get_result::<Ticker>(conn)?;

            if let Some(price) = &upsert.price {
                diesel::insert_into(ticker_price_snapshots::table)
                    .values(&price.for_ticker(ticker.id))
                    .execute(conn)?;
            }

            Ok(ticker)
        })
    }

    fn find_by_symbol(&self, symbol: &str) -> Result<Option<TickerView>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        ticker_view_query!()
            .filter(tickers::symbol.eq(symbol))
            .first::<(Ticker, Option<String>, Option<String>, Option<String>, Option<String>)>(
                &mut conn,
            )
            .optional()
            .map(|row| row.map(TickerView::from))
            .map_err(DatabaseError::from)
    }

    fn list_by_exchange(
        &self,
        exchange: ExchangeCode,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TickerView>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let rows = ticker_view_query!()
            .filter(exchanges::code.nullable().eq(exchange.as_str()))
            .order(tickers::symbol.asc())
            .limit(limit)
            .offset(offset)
            .load::<(Ticker, Option<String>, Option<String>, Option<String>, Option<String>)>(
                &mut conn,
            )?;

        Ok(rows.into_iter().map(TickerView::from).collect())
    }

    fn list(&self, limit: i64, offset: i64) -> Result<Vec<TickerView>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        let rows = ticker_view_query!()
            .order(tickers::symbol.asc())
            .limit(limit)
            .offset(offset)
            .load::<(Ticker, Option<String>, Option<String>, Option<String>, Option<String>)>(
                &mut conn,
            )?;

        Ok(rows.into_iter().map(TickerView::from).collect())
    }

    fn search(&self, query: &str, limit: i64) -> Result<Vec<TickerView>, DatabaseError> {
        let mut conn = (self.get_conn)()?;
        let pattern = format!("%{}%", escape_like(query));

        let rows = ticker_view_query!()
            .filter(
                tickers::symbol
                    .ilike(pattern.clone())
                    .escape('\\')
                    .or(tickers::name.ilike(pattern).escape('\\')),
            )
            .order(tickers::symbol.asc())
            .limit(limit)
            .load::<(Ticker, Option<String>, Option<String>, Option<String>, Option<String>)>(
                &mut conn,
            )?;

        Ok(rows.into_iter().map(TickerView::from).collect())
    }

    fn count(&self) -> Result<i64, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        tickers::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(DatabaseError::from)
    }

    fn latest_price(&self, symbol: &str) -> Result<Option<TickerPriceSnapshot>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        ticker_price_snapshots::table
            .inner_join(tickers::table)
            .filter(tickers::symbol.eq(symbol))
            .order((
                ticker_price_snapshots::recorded_at.desc(),
                ticker_price_snapshots::id.desc(),
            ))
            .select(TickerPriceSnapshot::as_select())
            .first::<TickerPriceSnapshot>(&mut conn)
            .optional()
            .map_err(DatabaseError::from)
    }
}

/// Make `%` and `_` in user input match literally
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::{establish_connection_pool, DatabasePool, PoolSettings};
    use crate::database::models::PriceObservation;
    use std::time::Duration;

    fn pool() -> Option<DatabasePool> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let settings = PoolSettings {
            max_size: 2,
            connection_timeout: Duration::from_secs(5),
            statement_timeout: Duration::from_secs(5),
        };
        let pool = establish_connection_pool(&url, settings).ok()?;
        pool.run_migrations().ok()?;
        Some(pool)
    }

    fn repository() -> Option<TickerRepositoryImpl> {
        let pool = pool()?;
        Some(TickerRepositoryImpl::new(move || pool.get_conn()))
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("AAPL"), "AAPL");
        assert_eq!(escape_like("AB_C"), "AB\\_C");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    // Requires a disposable PostgreSQL database in DATABASE_URL
    #[test]
    #[ignore]
    fn test_upsert_is_idempotent_against_postgres() {
        let Some(repo) = repository() else {
            return;
        };

        let first = TickerUpsert::new("ZZTEST", ExchangeCode::Nasdaq)
            .with_name("First Name")
            .with_sector("Test Sector")
            .with_price(PriceObservation {
                last_sale: Some(1.5),
                ..Default::default()
            });
        let second = TickerUpsert::new("ZZTEST", ExchangeCode::Nyse).with_name("Second Name");

        let a = repo.upsert(&first).unwrap();
        let b = repo.upsert(&second).unwrap();
        assert_eq!(a.id, b.id);

        let view = repo.find_by_symbol("ZZTEST").unwrap().unwrap();
        assert_eq!(view.name.as_deref(), Some("Second Name"));
        assert_eq!(view.exchange_code.as_deref(), Some("NYSE"));
        assert_eq!(view.sector, None);
        assert!(repo.latest_price("ZZTEST").unwrap().is_some());
    }

    // Requires a disposable PostgreSQL database in DATABASE_URL
    #[test]
    #[ignore]
    fn test_search_treats_wildcards_literally() {
        let Some(repo) = repository() else {
            return;
        };

        repo.upsert(&TickerUpsert::new("ZZ_Q1", ExchangeCode::Nasdaq).with_name("plain"))
            .unwrap();
        repo.upsert(&TickerUpsert::new("ZZAQ1", ExchangeCode::Nasdaq).with_name("100 Percent"))
            .unwrap();

        let found: Vec<_> = repo
            .search("ZZ_Q", 50)
            .unwrap()
            .into_iter()
            .map(|t| t.symbol)
            .collect();
        assert_eq!(found, ["ZZ_Q1"]);

        for hit in repo.search("%", 1000).unwrap() {
            let name = hit.name.unwrap_or_default();
            assert!(hit.symbol.contains('%') || name.contains('%'), "{} matched '%'", hit.symbol);
        }
    }

    // Requires a disposable PostgreSQL database in DATABASE_URL
    #[test]
    #[ignore]
    fn test_failed_upsert_rolls_back_new_dimensions() {
        let Some(pool) = pool() else {
            return;
        };
        let conn_pool = pool.clone();
        let repo = TickerRepositoryImpl::new(move || conn_pool.get_conn());

        let sector = format!("Rollback Sector {}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let mut upsert = TickerUpsert::new("ZZROLL", ExchangeCode::Nyse)
            .with_sector(sector.clone())
            .with_industry(format!("{} Industry", sector));
        upsert.country = Some("X".repeat(200));

        assert!(repo.upsert(&upsert).is_err());

        let mut conn = pool.get_conn().unwrap();
        let sectors_left: i64 = sectors::table
            .filter(sectors::name.eq(sector.as_str()))
            .count()
            .get_result(&mut conn)
            .unwrap();
        let industries_left: i64 = industries::table
            .filter(industries::name.eq(format!("{} Industry", sector)))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(sectors_left, 0);
        assert_eq!(industries_left, 0);
        assert!(repo.find_by_symbol("ZZROLL").unwrap().is_none());
    }
}
