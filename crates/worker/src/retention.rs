use chrono::{DateTime, Duration, Utc};
use finpulse_core::storage::Store;

pub const NEWS_RETENTION_DAYS: i64 = 30;

/// Rows published strictly before this instant are expired; a row exactly
/// `NEWS_RETENTION_DAYS` old is kept.
pub fn news_cutoff(cycle_started_at: DateTime<Utc>) -> DateTime<Utc> {
    cycle_started_at - Duration::days(NEWS_RETENTION_DAYS)
}

/// Deletes expired news. Returns the number of rows removed, or `None` if the store failed.
pub async fn sweep_expired_news(store: &dyn Store, cycle_started_at: DateTime<Utc>) -> Option<u64> {
    let cutoff = news_cutoff(cycle_started_at);
    match store.delete_news_older_than(cutoff).await {
        Ok(deleted) => {
            if deleted > 0 {
                tracing::info!(deleted, %cutoff, "pruned expired news");
            } else {
                tracing::debug!(%cutoff, "no expired news");
            }
            Some(deleted)
        }
        Err(err) => {
            tracing::warn!(error = %err, %cutoff, "news retention sweep failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::UnreachableStore;
    use chrono::TimeZone;
    use finpulse_core::storage::memory::MemoryStore;
    use finpulse_core::storage::NewNewsItem;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn aged(days: i64) -> NewNewsItem {
        NewNewsItem {
            ticker: "AMD".to_string(),
            headline: format!("headline aged {days} days"),
            sentiment_score: 0.0,
            published_at: now() - Duration::days(days),
        }
    }

    #[tokio::test]
    async fn deletes_31_days_keeps_30_and_29() {
        let store = MemoryStore::new();
        for days in [29, 30, 31] {
            store.push_news(aged(days)).await;
        }

        assert_eq!(sweep_expired_news(&store, now()).await, Some(1));

        let mut left: Vec<_> = store.all_news().await.into_iter().map(|n| n.headline).collect();
        left.sort();
        assert_eq!(left, vec!["headline aged 29 days", "headline aged 30 days"]);
    }

    #[tokio::test]
    async fn store_failure_is_reported_as_none() {
        assert_eq!(sweep_expired_news(&UnreachableStore, now()).await, None);
    }

    #[test]
    fn cutoff_is_thirty_days_before_cycle_start() {
        assert_eq!(news_cutoff(now()), Utc.with_ymd_and_hms(2026, 9, 19, 12, 0, 0).unwrap());
    }
}
