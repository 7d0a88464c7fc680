//! SQLite-backed quote store.

use async_trait::async_trait;
use chrono::Duration;
use quoteboard_common::{time, Quote, Timestamp};
use quoteboard_engine::{EngineError, EngineResult, QuoteSink};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{info, instrument};

use crate::error::StoreResult;

/// A quote as persisted, with its row id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredQuote {
    pub id: i64,
    pub source: String,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub fetched_at: Timestamp,
}

/// SQLite store for fetched quotes.
pub struct QuoteStore {
    pool: SqlitePool,
}

impl QuoteStore {
    /// Open (creating if missing) the database at `database_url` and set up
    /// the schema.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self::with_pool(pool);
        store.init_schema().await?;

        info!(database_url, "Connected to quote database");
        Ok(store)
    }

    /// Wrap an existing pool. The caller is responsible for `init_schema`.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the quotes table and indexes if they do not exist.
    pub async fn init_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS quotes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT NOT NULL,
                buy_price REAL NOT NULL,
                sell_price REAL NOT NULL,
                fetched_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_quotes_fetched_at ON quotes (fetched_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert one quote, returning its row id.
    #[instrument(skip(self, quote), fields(source = %quote.source))]
    pub async fn insert_quote(&self, quote: &Quote) -> StoreResult<i64> {
        let result = sqlx::query(
            "INSERT INTO quotes (source, buy_price, sell_price, fetched_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&quote.source)
        .bind(decimal_to_column(quote.buy_price))
        .bind(decimal_to_column(quote.sell_price))
        .bind(quote.fetched_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, "Quote saved");
        Ok(id)
    }

    /// Quotes fetched within the given lookback window, newest first.
    pub async fn recent_quotes(&self, window: Duration) -> StoreResult<Vec<StoredQuote>> {
        let cutoff = time::now() - window;

        let rows: Vec<(i64, String, f64, f64, Timestamp)> = sqlx::query_as(
            "SELECT id, source, buy_price, sell_price, fetched_at \
             FROM quotes WHERE fetched_at > ?1 ORDER BY fetched_at DESC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, source, buy_price, sell_price, fetched_at)| StoredQuote {
                id,
                source,
                buy_price: decimal_from_column(buy_price),
                sell_price: decimal_from_column(sell_price),
                fetched_at,
            })
            .collect())
    }
}

#[async_trait]
impl QuoteSink for QuoteStore {
    async fn store(&self, quote: &Quote) -> EngineResult<()> {
        self.insert_quote(quote)
            .await
            .map(|_| ())
            .map_err(|error| EngineError::PersistenceFailed {
                source: quote.source.clone(),
                reason: error.to_string(),
            })
    }
}

/// Prices are stored as REAL; `Decimal` always converts to a finite f64 at
/// quote magnitudes.
fn decimal_to_column(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Only NaN or infinite column values fail, which the insert path cannot
/// produce.
fn decimal_from_column(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}
