use crate::domain::stock::StockRecord;
use anyhow::Context;
use chrono::{DateTime, Utc};

type StockRow = (String, String, f64, f64, f64, i32, i32, i32, DateTime<Utc>);

const STOCK_COLUMNS: &str = "ticker, company_name, current_price, pe_ratio, market_cap, \
                             garp_score, growth_score, value_score, updated_at";

fn from_row(row: StockRow) -> StockRecord {
    let (
        ticker,
        company_name,
        current_price,
        pe_ratio,
        market_cap,
        garp_score,
        growth_score,
        value_score,
        updated_at,
    ) = row;
    StockRecord {
        ticker,
        company_name,
        current_price,
        pe_ratio,
        market_cap,
        garp_score,
        growth_score,
        value_score,
        updated_at,
    }
}

pub async fn upsert_stock(pool: &sqlx::PgPool, stock: &StockRecord) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO stocks (ticker, company_name, current_price, pe_ratio, market_cap, \
                             garp_score, growth_score, value_score, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (ticker) DO UPDATE \
           SET company_name = EXCLUDED.company_name, \
               current_price = EXCLUDED.current_price, \
               pe_ratio = EXCLUDED.pe_ratio, \
               market_cap = EXCLUDED.market_cap, \
               garp_score = EXCLUDED.garp_score, \
               growth_score = EXCLUDED.growth_score, \
               value_score = EXCLUDED.value_score, \
               updated_at = EXCLUDED.updated_at",
    )
    .persistent(false)
    .bind(&stock.ticker)
    .bind(&stock.company_name)
    .bind(stock.current_price)
    .bind(stock.pe_ratio)
    .bind(stock.market_cap)
    .bind(stock.garp_score)
    .bind(stock.growth_score)
    .bind(stock.value_score)
    .bind(stock.updated_at)
    .execute(pool)
    .await
    .with_context(|| format!("upsert stocks failed (ticker={})", stock.ticker))?;

    Ok(())
}

pub async fn distinct_tickers(pool: &sqlx::PgPool) -> anyhow::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT ticker FROM stocks")
        .persistent(false)
        .fetch_all(pool)
        .await
        .context("select distinct stocks.ticker failed")?;
    Ok(rows.into_iter().map(|(t,)| t).collect())
}

pub async fn get_stock(pool: &sqlx::PgPool, ticker: &str) -> anyhow::Result<Option<StockRecord>> {
    let row = sqlx::query_as::<_, StockRow>(&format!(
        "SELECT {STOCK_COLUMNS} FROM stocks WHERE ticker = $1"
    ))
    .persistent(false)
    .bind(ticker)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select stocks failed (ticker={ticker})"))?;

    Ok(row.map(from_row))
}

pub async fn list_stocks(pool: &sqlx::PgPool) -> anyhow::Result<Vec<StockRecord>> {
    let rows = sqlx::query_as::<_, StockRow>(&format!(
        "SELECT {STOCK_COLUMNS} FROM stocks ORDER BY updated_at DESC, ticker ASC"
    ))
    .persistent(false)
    .fetch_all(pool)
    .await
    .context("select all stocks failed")?;

    Ok(rows.into_iter().map(from_row).collect())
}
