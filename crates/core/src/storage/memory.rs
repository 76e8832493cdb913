use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::news::NewsItem;
use crate::domain::stock::StockRecord;
use crate::storage::{NewNewsItem, Store};

/// Process-local store with the same semantics as the Postgres tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    stocks: BTreeMap<String, StockRecord>,
    news: Vec<NewsItem>,
    next_news_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stock_count(&self) -> usize {
        self.inner.lock().await.stocks.len()
    }

    pub async fn all_news(&self) -> Vec<NewsItem> {
        self.inner.lock().await.news.clone()
    }

    /// Inserts a row without the duplicate check; used to seed fixtures.
    pub async fn push_news(&self, item: NewNewsItem) -> i64 {
        let mut t = self.inner.lock().await;
        t.push(item)
    }
}

impl Tables {
    fn push(&mut self, item: NewNewsItem) -> i64 {
        self.next_news_id += 1;
        let id = self.next_news_id;
        self.news.push(NewsItem {
            id,
            ticker: item.ticker,
            headline: item.headline,
            sentiment_score: item.sentiment_score,
            published_at: item.published_at,
        });
        id
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn upsert_stock(&self, stock: &StockRecord) -> Result<()> {
        let mut t = self.inner.lock().await;
        t.stocks.insert(stock.ticker.clone(), stock.clone());
        Ok(())
    }

    async fn insert_news_if_new(&self, item: &NewNewsItem) -> Result<bool> {
        let mut t = self.inner.lock().await;
        let exists = t
            .news
            .iter()
            .any(|n| n.ticker == item.ticker && n.headline == item.headline);
        if exists {
            return Ok(false);
        }
        t.push(item.clone());
        Ok(true)
    }

    async fn delete_news_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut t = self.inner.lock().await;
        let before = t.news.len();
        t.news.retain(|n| n.published_at >= cutoff);
        Ok((before - t.news.len()) as u64)
    }

    async fn distinct_tickers(&self) -> Result<Vec<String>> {
        Ok(self.inner.lock().await.stocks.keys().cloned().collect())
    }

    async fn get_stock(&self, ticker: &str) -> Result<Option<StockRecord>> {
        Ok(self.inner.lock().await.stocks.get(ticker).cloned())
    }

    async fn list_stocks(&self) -> Result<Vec<StockRecord>> {
        let t = self.inner.lock().await;
        let mut out: Vec<StockRecord> = t.stocks.values().cloned().collect();
        out.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        Ok(out)
    }

    async fn recent_news(&self, ticker: &str, limit: i64) -> Result<Vec<NewsItem>> {
        let t = self.inner.lock().await;
        let mut out: Vec<NewsItem> = t.news.iter().filter(|n| n.ticker == ticker).cloned().collect();
        out.sort_by(|a, b| b.published_at.cmp(&a.published_at).then_with(|| b.id.cmp(&a.id)));
        out.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(out)
    }
}
