use crate::domain::news::NewsItem;
use crate::storage::NewNewsItem;
use anyhow::Context;
use chrono::{DateTime, Utc};

pub async fn insert_news_if_new(pool: &sqlx::PgPool, item: &NewNewsItem) -> anyhow::Result<bool> {
    // Not atomic: a concurrent writer can insert between the check and the insert.
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM news WHERE ticker = $1 AND headline = $2 LIMIT 1")
            .persistent(false)
            .bind(&item.ticker)
            .bind(&item.headline)
            .fetch_optional(pool)
            .await
            .context("select news duplicate check failed")?;

    if existing.is_some() {
        return Ok(false);
    }

    sqlx::query(
        "INSERT INTO news (ticker, headline, sentiment_score, published_at) \
         VALUES ($1, $2, $3, $4)",
    )
    .persistent(false)
    .bind(&item.ticker)
    .bind(&item.headline)
    .bind(item.sentiment_score)
    .bind(item.published_at)
    .execute(pool)
    .await
    .context("insert news failed")?;

    Ok(true)
}

pub async fn delete_news_older_than(
    pool: &sqlx::PgPool,
    cutoff: DateTime<Utc>,
) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM news WHERE published_at < $1")
        .persistent(false)
        .bind(cutoff)
        .execute(pool)
        .await
        .context("delete expired news failed")?;
    Ok(res.rows_affected())
}

pub async fn recent_news(
    pool: &sqlx::PgPool,
    ticker: &str,
    limit: i64,
) -> anyhow::Result<Vec<NewsItem>> {
    let rows = sqlx::query_as::<_, (i64, String, String, f64, DateTime<Utc>)>(
        "SELECT id, ticker, headline, sentiment_score, published_at \
         FROM news \
         WHERE ticker = $1 \
         ORDER BY published_at DESC, id DESC \
         LIMIT $2",
    )
    .persistent(false)
    .bind(ticker)
    .bind(limit)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select recent news failed (ticker={ticker})"))?;

    Ok(rows
        .into_iter()
        .map(|(id, ticker, headline, sentiment_score, published_at)| NewsItem {
            id,
            ticker,
            headline,
            sentiment_score,
            published_at,
        })
        .collect())
}
