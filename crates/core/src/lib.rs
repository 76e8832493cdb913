pub mod domain;
pub mod ingest;
pub mod news;
pub mod scoring;
pub mod storage;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    /// Liquid large-caps and broad ETFs that are always part of the worker's universe.
    pub const DEFAULT_TICKERS: [&str; 24] = [
        "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "ADBE", "CRM", "ORCL",
        "IBM", "INTC", "AMD", "UBER", "LYFT", "SPY", "QQQ", "IWM", "GLD", "SLV", "TLT", "VTI",
        "VXUS",
    ];

    const DEFAULT_INTERVAL_SECS: u64 = 300;
    const DEFAULT_POLL_SECS: u64 = 60;
    const DEFAULT_ERROR_BACKOFF_SECS: u64 = 60;
    pub const DEFAULT_TICKER_DELAY_MS: u64 = 1000;
    pub const DEFAULT_NEWS_MAX_ITEMS: usize = 5;
    const DEFAULT_MARKET_DATA_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_NEWS_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_HEADLINE_SELECTOR: &str = "h3";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub worker_interval: Duration,
        pub worker_poll: Duration,
        pub worker_error_backoff: Duration,
        pub ticker_delay: Duration,
        pub news_max_items: usize,
        pub default_tickers: Vec<String>,
        pub market_data_timeout: Duration,
        pub news_timeout: Duration,
        pub news_headline_selector: String,
        pub port: Option<u16>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let default_tickers = match std::env::var("WORKER_DEFAULT_TICKERS") {
                Ok(s) => parse_ticker_list(&s),
                Err(_) => builtin_tickers(),
            };
            anyhow::ensure!(
                !default_tickers.is_empty(),
                "WORKER_DEFAULT_TICKERS must contain at least one ticker"
            );

            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                worker_interval: Duration::from_secs(
                    env_parse("WORKER_INTERVAL").unwrap_or(DEFAULT_INTERVAL_SECS),
                ),
                worker_poll: Duration::from_secs(
                    env_parse("WORKER_POLL_SECS").unwrap_or(DEFAULT_POLL_SECS),
                ),
                worker_error_backoff: Duration::from_secs(
                    env_parse("WORKER_ERROR_BACKOFF_SECS").unwrap_or(DEFAULT_ERROR_BACKOFF_SECS),
                ),
                ticker_delay: Duration::from_millis(
                    env_parse("WORKER_TICKER_DELAY_MS").unwrap_or(DEFAULT_TICKER_DELAY_MS),
                ),
                news_max_items: env_parse("WORKER_NEWS_MAX_ITEMS")
                    .unwrap_or(DEFAULT_NEWS_MAX_ITEMS),
                default_tickers,
                market_data_timeout: Duration::from_secs(
                    env_parse("MARKET_DATA_TIMEOUT_SECS")
                        .unwrap_or(DEFAULT_MARKET_DATA_TIMEOUT_SECS),
                ),
                news_timeout: Duration::from_secs(
                    env_parse("NEWS_TIMEOUT_SECS").unwrap_or(DEFAULT_NEWS_TIMEOUT_SECS),
                ),
                news_headline_selector: std::env::var("NEWS_HEADLINE_SELECTOR")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_HEADLINE_SELECTOR.to_string()),
                port: env_parse("PORT"),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }
    }

    pub fn builtin_tickers() -> Vec<String> {
        DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect()
    }

    fn parse_ticker_list(s: &str) -> Vec<String> {
        s.split(',')
            .filter_map(crate::domain::stock::canonical_ticker)
            .collect()
    }

    fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
    }

}
