use crate::config::Settings;
use crate::ingest::yahoo::USER_AGENT;
use crate::news::NewsSource;
use anyhow::{Context, Result};

const NEWS_BASE_URL: &str = "https://finance.yahoo.com";

/// Fetches the per-ticker news listing page from Yahoo Finance.
#[derive(Debug, Clone)]
pub struct YahooNewsSource {
    http: reqwest::Client,
    base_url: String,
}

impl YahooNewsSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.news_timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build news http client")?;

        Ok(Self {
            http,
            base_url: NEWS_BASE_URL.to_string(),
        })
    }

    fn url(&self, ticker: &str) -> String {
        format!("{}/quote/{ticker}/news", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl NewsSource for YahooNewsSource {
    async fn fetch_page(&self, ticker: &str) -> Result<String> {
        let res = self
            .http
            .get(self.url(ticker))
            .send()
            .await
            .context("news request failed")?;

        let status = res.status();
        if !status.is_success() {
            anyhow::bail!("news page HTTP {status} for {ticker}");
        }

        res.text().await.context("failed to read news page")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_listing_url() {
        let s = YahooNewsSource {
            http: reqwest::Client::new(),
            base_url: "https://finance.example/".to_string(),
        };
        assert_eq!(s.url("NVDA"), "https://finance.example/quote/NVDA/news");
    }
}
