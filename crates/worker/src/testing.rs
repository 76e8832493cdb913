//! Fakes for the worker's collaborators.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use finpulse_core::domain::news::NewsItem;
use finpulse_core::domain::stock::{
    Fundamentals, MarketSnapshot, PriceBar, PriceHistory, StockRecord,
};
use finpulse_core::ingest::provider::{HistoryRange, MarketDataProvider, MarketFetch};
use finpulse_core::news::{HeadlineExtractor, NewsSource};
use finpulse_core::storage::{NewNewsItem, Store};

pub fn snapshot(ticker: &str, pe: f64, revenue_growth: f64, close: f64) -> MarketSnapshot {
    let at = Utc.with_ymd_and_hms(2026, 10, 16, 20, 0, 0).unwrap();
    MarketSnapshot {
        ticker: ticker.to_string(),
        company_name: format!("{ticker} Inc."),
        fundamentals: Fundamentals {
            pe_ratio: pe,
            revenue_growth,
            ..Default::default()
        },
        history: PriceHistory {
            bars: vec![PriceBar {
                at,
                high: close,
                low: close,
                close,
            }],
        },
    }
}

/// Unknown tickers are `NotFound`.
#[derive(Default)]
pub struct FakeMarket {
    found: HashMap<String, MarketSnapshot>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
}

impl FakeMarket {
    pub fn found(mut self, snapshot: MarketSnapshot) -> Self {
        self.found.insert(snapshot.ticker.clone(), snapshot);
        self
    }

    pub fn failing(mut self, ticker: &str) -> Self {
        self.failing.insert(ticker.to_string());
        self
    }

    pub fn panicking(mut self, ticker: &str) -> Self {
        self.panicking.insert(ticker.to_string());
        self
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for FakeMarket {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, ticker: &str, _range: HistoryRange) -> Result<MarketFetch> {
        if self.panicking.contains(ticker) {
            panic!("malformed quote payload for {ticker}");
        }
        if self.failing.contains(ticker) {
            anyhow::bail!("provider timed out for {ticker}");
        }
        Ok(self
            .found
            .get(ticker)
            .cloned()
            .map(MarketFetch::Found)
            .unwrap_or(MarketFetch::NotFound))
    }
}

/// Unknown tickers get an empty page.
#[derive(Default)]
pub struct FixtureNewsSource {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
}

impl FixtureNewsSource {
    pub fn page(mut self, ticker: &str, body: &str) -> Self {
        self.pages.insert(ticker.to_string(), body.to_string());
        self
    }

    pub fn failing(mut self, ticker: &str) -> Self {
        self.failing.insert(ticker.to_string());
        self
    }

    pub fn panicking(mut self, ticker: &str) -> Self {
        self.panicking.insert(ticker.to_string());
        self
    }
}

#[async_trait::async_trait]
impl NewsSource for FixtureNewsSource {
    async fn fetch_page(&self, ticker: &str) -> Result<String> {
        if self.panicking.contains(ticker) {
            panic!("news page decoder blew up for {ticker}");
        }
        if self.failing.contains(ticker) {
            anyhow::bail!("news page HTTP 503 for {ticker}");
        }
        Ok(self.pages.get(ticker).cloned().unwrap_or_default())
    }
}

/// One headline per non-blank line.
pub struct LineExtractor;

impl HeadlineExtractor for LineExtractor {
    fn extract(&self, page: &str) -> Vec<String> {
        page.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Every call fails as if the database were down.
pub struct UnreachableStore;

fn down<T>() -> Result<T> {
    anyhow::bail!("connection refused")
}

#[async_trait::async_trait]
impl Store for UnreachableStore {
    async fn upsert_stock(&self, _stock: &StockRecord) -> Result<()> {
        down()
    }

    async fn insert_news_if_new(&self, _item: &NewNewsItem) -> Result<bool> {
        down()
    }

    async fn delete_news_older_than(&self, _cutoff: DateTime<Utc>) -> Result<u64> {
        down()
    }

    async fn distinct_tickers(&self) -> Result<Vec<String>> {
        down()
    }

    async fn get_stock(&self, _ticker: &str) -> Result<Option<StockRecord>> {
        down()
    }

    async fn list_stocks(&self) -> Result<Vec<StockRecord>> {
        down()
    }

    async fn recent_news(&self, _ticker: &str, _limit: i64) -> Result<Vec<NewsItem>> {
        down()
    }
}
