//! Sole writer of the `stocks` and `news` tables.

pub mod memory;
pub mod news;
pub mod stocks;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::domain::news::NewsItem;
use crate::domain::stock::StockRecord;

pub async fn migrate(pool: &sqlx::PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

/// A headline to be stored unless `(ticker, headline)` already exists.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNewsItem {
    pub ticker: String,
    pub headline: String,
    pub sentiment_score: f64,
    pub published_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Insert-or-update keyed by ticker; every column is overwritten on conflict.
    async fn upsert_stock(&self, stock: &StockRecord) -> Result<()>;

    /// Returns whether a row was inserted. The existence check and the insert are separate
    /// statements, so concurrent writers can still produce duplicates.
    async fn insert_news_if_new(&self, item: &NewNewsItem) -> Result<bool>;

    /// Deletes rows with `published_at < cutoff`.
    async fn delete_news_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    async fn distinct_tickers(&self) -> Result<Vec<String>>;

    async fn get_stock(&self, ticker: &str) -> Result<Option<StockRecord>>;

    /// Newest `updated_at` first.
    async fn list_stocks(&self) -> Result<Vec<StockRecord>>;

    /// Newest `published_at` first.
    async fn recent_news(&self, ticker: &str, limit: i64) -> Result<Vec<NewsItem>>;
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: sqlx::PgPool,
}

impl PgStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn upsert_stock(&self, stock: &StockRecord) -> Result<()> {
        stocks::upsert_stock(&self.pool, stock).await
    }

    async fn insert_news_if_new(&self, item: &NewNewsItem) -> Result<bool> {
        news::insert_news_if_new(&self.pool, item).await
    }

    async fn delete_news_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        news::delete_news_older_than(&self.pool, cutoff).await
    }

    async fn distinct_tickers(&self) -> Result<Vec<String>> {
        stocks::distinct_tickers(&self.pool).await
    }

    async fn get_stock(&self, ticker: &str) -> Result<Option<StockRecord>> {
        stocks::get_stock(&self.pool, ticker).await
    }

    async fn list_stocks(&self) -> Result<Vec<StockRecord>> {
        stocks::list_stocks(&self.pool).await
    }

    async fn recent_news(&self, ticker: &str, limit: i64) -> Result<Vec<NewsItem>> {
        news::recent_news(&self.pool, ticker, limit).await
    }
}
