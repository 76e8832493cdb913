use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use finpulse_core::config::{DEFAULT_NEWS_MAX_ITEMS, DEFAULT_TICKER_DELAY_MS};
use finpulse_core::domain::stock::StockRecord;
use finpulse_core::ingest::provider::{HistoryRange, MarketDataProvider, MarketFetch};
use finpulse_core::news::NewsCollector;
use finpulse_core::scoring::ScoringStrategy;
use finpulse_core::storage::{NewNewsItem, Store};
use futures::FutureExt;

use crate::retention;
use crate::universe::TickerUniverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockOutcome {
    Updated,
    NotFound,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub tickers: usize,
    pub stocks_updated: usize,
    pub stocks_not_found: usize,
    pub stock_failures: usize,
    pub news_inserted: usize,
    pub news_failures: usize,
    pub news_pruned: Option<u64>,
}

pub struct Orchestrator {
    store: Arc<dyn Store>,
    market: Arc<dyn MarketDataProvider>,
    news: NewsCollector,
    universe: TickerUniverse,
    strategy: Box<dyn ScoringStrategy>,
    ticker_delay: Duration,
    news_max_items: usize,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn Store>,
        market: Arc<dyn MarketDataProvider>,
        news: NewsCollector,
        universe: TickerUniverse,
        strategy: Box<dyn ScoringStrategy>,
    ) -> Self {
        Self {
            store,
            market,
            news,
            universe,
            strategy,
            ticker_delay: Duration::from_millis(DEFAULT_TICKER_DELAY_MS),
            news_max_items: DEFAULT_NEWS_MAX_ITEMS,
        }
    }

    pub fn with_ticker_delay(mut self, delay: Duration) -> Self {
        self.ticker_delay = delay;
        self
    }

    pub fn with_news_max_items(mut self, max_items: usize) -> Self {
        self.news_max_items = max_items;
        self
    }

    /// One pass over the ticker universe followed by the retention sweep. Tickers are handled
    /// one at a time; a failure for one ticker never stops the rest.
    pub async fn run_cycle(&self, started_at: DateTime<Utc>) -> CycleReport {
        let tickers = self.universe.resolve(self.store.as_ref()).await;
        let total = tickers.len();
        tracing::info!(
            tickers = total,
            strategy = self.strategy.name(),
            provider = self.market.provider_name(),
            "cycle started"
        );

        let mut report = CycleReport {
            tickers: total,
            ..Default::default()
        };

        for (idx, ticker) in tickers.iter().enumerate() {
            if idx != 0 && !self.ticker_delay.is_zero() {
                tokio::time::sleep(self.ticker_delay).await;
            }

            tracing::debug!(%ticker, processed = idx, total, "processing ticker");

            match contain_panic(self.update_stock(ticker)).await {
                Ok(StockOutcome::Updated) => report.stocks_updated += 1,
                Ok(StockOutcome::NotFound) => {
                    report.stocks_not_found += 1;
                    tracing::warn!(%ticker, "no price history; skipping stock update");
                }
                Err(err) => {
                    report.stock_failures += 1;
                    sentry_anyhow::capture_anyhow(&err);
                    tracing::warn!(%ticker, error = %format!("{err:#}"), "stock update failed");
                }
            }

            match contain_panic(self.update_news(ticker)).await {
                Ok(inserted) => report.news_inserted += inserted,
                Err(err) => {
                    report.news_failures += 1;
                    sentry_anyhow::capture_anyhow(&err);
                    tracing::warn!(%ticker, error = %format!("{err:#}"), "news update failed");
                }
            }
        }

        report.news_pruned = retention::sweep_expired_news(self.store.as_ref(), started_at).await;

        tracing::info!(
            tickers = report.tickers,
            stocks_updated = report.stocks_updated,
            stocks_not_found = report.stocks_not_found,
            stock_failures = report.stock_failures,
            news_inserted = report.news_inserted,
            news_failures = report.news_failures,
            "cycle completed"
        );
        report
    }

    async fn update_stock(&self, ticker: &str) -> anyhow::Result<StockOutcome> {
        let fetched = self
            .market
            .fetch(ticker, HistoryRange::FiveDays)
            .await
            .with_context(|| format!("market data fetch failed for {ticker}"))?;

        let snapshot = match fetched {
            MarketFetch::Found(snapshot) => snapshot,
            MarketFetch::NotFound => return Ok(StockOutcome::NotFound),
        };

        let scores = self.strategy.score(&snapshot.fundamentals);
        let Some(record) = StockRecord::from_snapshot(&snapshot, scores, Utc::now()) else {
            return Ok(StockOutcome::NotFound);
        };

        self.store.upsert_stock(&record).await?;
        tracing::info!(
            %ticker,
            price = record.current_price,
            garp = record.garp_score,
            growth = record.growth_score,
            value = record.value_score,
            "stock updated"
        );
        Ok(StockOutcome::Updated)
    }

    async fn update_news(&self, ticker: &str) -> anyhow::Result<usize> {
        let headlines = self
            .news
            .collect(ticker, self.news_max_items, Utc::now())
            .await;
        if headlines.is_empty() {
            tracing::debug!(%ticker, "no headlines collected");
            return Ok(0);
        }

        let mut inserted = 0;
        for h in headlines {
            let item = NewNewsItem {
                ticker: ticker.to_string(),
                headline: h.headline,
                sentiment_score: h.sentiment_score,
                published_at: h.published_at,
            };
            if self.store.insert_news_if_new(&item).await? {
                inserted += 1;
            }
        }

        tracing::info!(%ticker, inserted, "news updated");
        Ok(inserted)
    }
}

/// Turns a panic inside `fut` into an error so it is handled like any other ticker failure.
async fn contain_panic<T>(fut: impl Future<Output = anyhow::Result<T>>) -> anyhow::Result<T> {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(anyhow::anyhow!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
