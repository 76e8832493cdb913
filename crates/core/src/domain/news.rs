use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A headline scored by the collector, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedHeadline {
    pub headline: String,
    /// Polarity in [-1, 1].
    pub sentiment_score: f64,
    /// Collection time; the news page does not expose publish dates.
    pub published_at: DateTime<Utc>,
}

/// One row of the `news` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub ticker: String,
    pub headline: String,
    pub sentiment_score: f64,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub overall_score: f64,
    pub sentiment_label: SentimentLabel,
    pub news_count: usize,
}

impl SentimentSummary {
    pub fn from_items(items: &[NewsItem]) -> Self {
        if items.is_empty() {
            return Self {
                overall_score: 0.0,
                sentiment_label: SentimentLabel::Neutral,
                news_count: 0,
            };
        }

        let avg = items.iter().map(|i| i.sentiment_score).sum::<f64>() / items.len() as f64;
        let sentiment_label = if avg > 0.1 {
            SentimentLabel::Positive
        } else if avg < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        Self {
            overall_score: (avg * 1000.0).round() / 1000.0,
            sentiment_label,
            news_count: items.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(score: f64) -> NewsItem {
        NewsItem {
            id: 1,
            ticker: "MSFT".to_string(),
            headline: "Microsoft ships something".to_string(),
            sentiment_score: score,
            published_at: Utc::now(),
        }
    }

    #[test]
    fn empty_news_is_neutral() {
        let s = SentimentSummary::from_items(&[]);
        assert_eq!(s.sentiment_label, SentimentLabel::Neutral);
        assert_eq!(s.news_count, 0);
        assert_eq!(s.overall_score, 0.0);
    }

    #[test]
    fn labels_follow_average_thresholds() {
        let pos = SentimentSummary::from_items(&[item(0.5), item(0.0)]);
        assert_eq!(pos.sentiment_label, SentimentLabel::Positive);
        assert_eq!(pos.overall_score, 0.25);

        let neg = SentimentSummary::from_items(&[item(-0.3), item(-0.3), item(0.0)]);
        assert_eq!(neg.sentiment_label, SentimentLabel::Negative);
        assert_eq!(neg.overall_score, -0.2);

        // Exactly 0.1 is not "greater than" 0.1.
        let edge = SentimentSummary::from_items(&[item(0.1)]);
        assert_eq!(edge.sentiment_label, SentimentLabel::Neutral);
    }
}
