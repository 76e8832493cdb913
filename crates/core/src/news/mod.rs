//! Headline collection and sentiment scoring.
//!
//! The collector only orchestrates three narrow collaborators: a [`NewsSource`] that returns
//! the raw listing page, a [`HeadlineExtractor`] that turns page text into candidate
//! headlines, and a [`SentimentScorer`] that maps text to a polarity. Every failure inside
//! [`NewsCollector::collect`] is soft: it is logged and yields an empty list.

pub mod html;
pub mod sentiment;
pub mod source;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::domain::news::CollectedHeadline;

/// Headlines shorter than this many characters are discarded.
pub const MIN_HEADLINE_CHARS: usize = 10;

#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_page(&self, ticker: &str) -> Result<String>;
}

pub trait HeadlineExtractor: Send + Sync {
    /// Candidate headlines in page order, trimmed.
    fn extract(&self, page: &str) -> Vec<String>;
}

pub trait SentimentScorer: Send + Sync {
    /// Polarity in [-1, 1].
    fn polarity(&self, text: &str) -> f64;
}

pub struct NewsCollector {
    source: Box<dyn NewsSource>,
    extractor: Box<dyn HeadlineExtractor>,
    scorer: Box<dyn SentimentScorer>,
}

impl NewsCollector {
    pub fn new(
        source: Box<dyn NewsSource>,
        extractor: Box<dyn HeadlineExtractor>,
        scorer: Box<dyn SentimentScorer>,
    ) -> Self {
        Self {
            source,
            extractor,
            scorer,
        }
    }

    pub async fn collect(
        &self,
        ticker: &str,
        max_items: usize,
        observed_at: DateTime<Utc>,
    ) -> Vec<CollectedHeadline> {
        let page = match self.source.fetch_page(ticker).await {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(%ticker, error = %err, "news page fetch failed; skipping news");
                return Vec::new();
            }
        };

        self.score_page(&page, max_items, observed_at)
    }

    /// The first `max_items` candidates are considered before short ones are filtered out.
    pub fn score_page(
        &self,
        page: &str,
        max_items: usize,
        observed_at: DateTime<Utc>,
    ) -> Vec<CollectedHeadline> {
        self.extractor
            .extract(page)
            .into_iter()
            .take(max_items)
            .filter(|h| h.chars().count() >= MIN_HEADLINE_CHARS)
            .map(|headline| {
                let sentiment_score = self.scorer.polarity(&headline).clamp(-1.0, 1.0);
                CollectedHeadline {
                    headline,
                    sentiment_score,
                    published_at: observed_at,
                }
            })
            .collect()
    }
}
