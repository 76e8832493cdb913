use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::Scores;

/// Upper-cases and trims a ticker symbol; blank input yields `None`.
pub fn canonical_ticker(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    Some(t.to_ascii_uppercase())
}

/// Factor inputs used by the scoring strategies. Fields the provider omits are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe_ratio: f64,
    pub peg_ratio: f64,
    pub price_to_book: f64,
    pub roe: f64,
    pub debt_to_equity: f64,
    /// Fraction, e.g. 0.12 for 12%.
    pub revenue_growth: f64,
    pub market_cap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub at: DateTime<Utc>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Daily bars ordered oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn current_price(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn high(&self) -> Option<f64> {
        self.bars.iter().map(|b| b.high).reduce(f64::max)
    }

    pub fn low(&self) -> Option<f64> {
        self.bars.iter().map(|b| b.low).reduce(f64::min)
    }
}

/// What the market data provider knows about one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub ticker: String,
    pub company_name: String,
    pub fundamentals: Fundamentals,
    pub history: PriceHistory,
}

/// One row of the `stocks` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub ticker: String,
    pub company_name: String,
    pub current_price: f64,
    pub pe_ratio: f64,
    pub market_cap: f64,
    pub garp_score: i32,
    pub growth_score: i32,
    pub value_score: i32,
    pub updated_at: DateTime<Utc>,
}

impl StockRecord {
    /// Returns `None` when the snapshot carries no price bars.
    pub fn from_snapshot(
        snapshot: &MarketSnapshot,
        scores: Scores,
        updated_at: DateTime<Utc>,
    ) -> Option<Self> {
        let current_price = snapshot.history.current_price()?;
        Some(Self {
            ticker: snapshot.ticker.clone(),
            company_name: snapshot.company_name.clone(),
            current_price,
            pe_ratio: snapshot.fundamentals.pe_ratio,
            market_cap: snapshot.fundamentals.market_cap,
            garp_score: scores.garp,
            growth_score: scores.growth,
            value_score: scores.value,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(day: u32, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar {
            at: Utc.with_ymd_and_hms(2026, 3, day, 21, 0, 0).unwrap(),
            high,
            low,
            close,
        }
    }

    #[test]
    fn canonical_ticker_uppercases_and_trims() {
        assert_eq!(canonical_ticker("  aapl "), Some("AAPL".to_string()));
        assert_eq!(canonical_ticker("   "), None);
    }

    #[test]
    fn history_reports_last_close_and_extremes() {
        let history = PriceHistory {
            bars: vec![bar(2, 105.0, 98.0, 100.0), bar(3, 112.0, 101.0, 110.0), bar(4, 111.0, 95.5, 96.0)],
        };
        assert_eq!(history.current_price(), Some(96.0));
        assert_eq!(history.high(), Some(112.0));
        assert_eq!(history.low(), Some(95.5));
    }

    #[test]
    fn record_requires_a_price() {
        let snapshot = MarketSnapshot {
            ticker: "AAPL".to_string(),
            company_name: "Apple Inc.".to_string(),
            fundamentals: Fundamentals::default(),
            history: PriceHistory::default(),
        };
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
        assert!(StockRecord::from_snapshot(&snapshot, Scores::default(), now).is_none());
    }
}
