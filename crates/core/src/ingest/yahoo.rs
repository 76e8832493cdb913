use crate::config::Settings;
use crate::domain::stock::MarketSnapshot;
use crate::ingest::provider::{HistoryRange, MarketDataProvider, MarketFetch};
use crate::ingest::types::{ChartResponse, QuoteSummaryResponse};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com";
const SUMMARY_BASE_URL: &str = "https://query2.finance.yahoo.com";
const SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData";
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    http: reqwest::Client,
    chart_base_url: String,
    summary_base_url: String,
}

impl YahooFinanceClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.market_data_timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            chart_base_url: CHART_BASE_URL.to_string(),
            summary_base_url: SUMMARY_BASE_URL.to_string(),
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!(
            "{}/v8/finance/chart/{ticker}",
            self.chart_base_url.trim_end_matches('/')
        )
    }

    fn summary_url(&self, ticker: &str) -> String {
        format!(
            "{}/v10/finance/quoteSummary/{ticker}",
            self.summary_base_url.trim_end_matches('/')
        )
    }

    /// `Ok(None)` on HTTP 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("market data request failed: {url}"))?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let text = res
            .text()
            .await
            .context("failed to read market data response")?;
        if !status.is_success() {
            anyhow::bail!("market data HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<T>(&text)
            .with_context(|| format!("market data response has unexpected shape: {url}"))?;
        Ok(Some(parsed))
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooFinanceClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_finance"
    }

    async fn fetch(&self, ticker: &str, range: HistoryRange) -> Result<MarketFetch> {
        let chart: Option<ChartResponse> = self
            .get_json(
                self.chart_url(ticker),
                &[("range", range.as_query()), ("interval", "1d")],
            )
            .await?;
        let Some(chart) = chart else {
            return Ok(MarketFetch::NotFound);
        };

        let history = chart.price_history();
        if history.is_empty() {
            return Ok(MarketFetch::NotFound);
        }

        let summary: Option<QuoteSummaryResponse> = self
            .get_json(self.summary_url(ticker), &[("modules", SUMMARY_MODULES)])
            .await?;

        let fundamentals = summary
            .as_ref()
            .map(|s| s.fundamentals())
            .unwrap_or_default();
        let company_name = summary
            .as_ref()
            .and_then(|s| s.company_name())
            .or_else(|| chart.company_name())
            .unwrap_or_else(|| ticker.to_string());

        Ok(MarketFetch::Found(MarketSnapshot {
            ticker: ticker.to_string(),
            company_name,
            fundamentals,
            history,
        }))
    }
}
