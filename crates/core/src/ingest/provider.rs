use anyhow::Result;

use crate::domain::stock::MarketSnapshot;

/// How much daily history to request alongside fundamentals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    /// Enough for a current price; used by the background worker.
    FiveDays,
    /// Enough for 52-week high/low; used by the on-demand screen.
    OneYear,
}

impl HistoryRange {
    pub fn as_query(&self) -> &'static str {
        match self {
            HistoryRange::FiveDays => "5d",
            HistoryRange::OneYear => "1y",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarketFetch {
    Found(MarketSnapshot),
    /// The provider has no price history for the symbol.
    NotFound,
}

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Transport and provider failures are errors; an unknown symbol is `NotFound`.
    async fn fetch(&self, ticker: &str, range: HistoryRange) -> Result<MarketFetch>;
}
