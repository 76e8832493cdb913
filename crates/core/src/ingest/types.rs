//! Wire shapes of the Yahoo Finance chart and quoteSummary endpoints.
//!
//! Yahoo reports missing numbers either as absent keys, `null`, or `{}`; every numeric
//! field is optional and defaults to 0 once converted to domain types.

use chrono::{TimeZone, Utc};
use serde::Deserialize;

use crate::domain::stock::{Fundamentals, PriceBar, PriceHistory};

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResponse {
    fn first(&self) -> Option<&ChartResult> {
        self.chart.result.as_ref().and_then(|r| r.first())
    }

    /// Bars without a close are dropped; a missing high/low falls back to the close.
    pub fn price_history(&self) -> PriceHistory {
        let Some(result) = self.first() else {
            return PriceHistory::default();
        };
        let Some(quote) = result.indicators.quote.first() else {
            return PriceHistory::default();
        };

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (idx, ts) in result.timestamp.iter().enumerate() {
            let Some(close) = quote.close.get(idx).copied().flatten() else {
                continue;
            };
            let Some(at) = Utc.timestamp_opt(*ts, 0).single() else {
                continue;
            };
            let high = quote.high.get(idx).copied().flatten().unwrap_or(close);
            let low = quote.low.get(idx).copied().flatten().unwrap_or(close);
            bars.push(PriceBar { at, high, low, close });
        }

        PriceHistory { bars }
    }

    pub fn company_name(&self) -> Option<String> {
        let meta = &self.first()?.meta;
        meta.long_name.clone().or_else(|| meta.short_name.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResponse {
    pub quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryEnvelope {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub price: Option<PriceModule>,
    #[serde(default)]
    pub summary_detail: Option<SummaryDetailModule>,
    #[serde(default)]
    pub default_key_statistics: Option<KeyStatisticsModule>,
    #[serde(default)]
    pub financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawNumber {
    #[serde(default)]
    pub raw: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    #[serde(default)]
    pub market_cap: Option<RawNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetailModule {
    #[serde(default, rename = "trailingPE")]
    pub trailing_pe: Option<RawNumber>,
    #[serde(default)]
    pub market_cap: Option<RawNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatisticsModule {
    #[serde(default)]
    pub peg_ratio: Option<RawNumber>,
    #[serde(default)]
    pub price_to_book: Option<RawNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDataModule {
    #[serde(default)]
    pub return_on_equity: Option<RawNumber>,
    #[serde(default)]
    pub debt_to_equity: Option<RawNumber>,
    #[serde(default)]
    pub revenue_growth: Option<RawNumber>,
}

fn num(v: Option<RawNumber>) -> f64 {
    v.and_then(|n| n.raw).filter(|x| x.is_finite()).unwrap_or(0.0)
}

impl QuoteSummaryResponse {
    fn first(&self) -> Option<&QuoteSummaryResult> {
        self.quote_summary.result.as_ref().and_then(|r| r.first())
    }

    pub fn fundamentals(&self) -> Fundamentals {
        let Some(r) = self.first() else {
            return Fundamentals::default();
        };
        let detail = r.summary_detail.clone().unwrap_or_default();
        let stats = r.default_key_statistics.clone().unwrap_or_default();
        let fin = r.financial_data.clone().unwrap_or_default();
        let price = r.price.clone().unwrap_or_default();

        let mut market_cap = num(detail.market_cap);
        if market_cap == 0.0 {
            market_cap = num(price.market_cap);
        }

        Fundamentals {
            pe_ratio: num(detail.trailing_pe),
            peg_ratio: num(stats.peg_ratio),
            price_to_book: num(stats.price_to_book),
            roe: num(fin.return_on_equity),
            debt_to_equity: num(fin.debt_to_equity),
            revenue_growth: num(fin.revenue_growth),
            market_cap,
        }
    }

    pub fn company_name(&self) -> Option<String> {
        let price = self.first()?.price.as_ref()?;
        price.long_name.clone().or_else(|| price.short_name.clone())
    }
}
