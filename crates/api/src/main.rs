use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finpulse_core::config::Settings;
use finpulse_core::domain::news::{NewsItem, SentimentSummary};
use finpulse_core::domain::stock::{canonical_ticker, Fundamentals, MarketSnapshot, StockRecord};
use finpulse_core::ingest::provider::{HistoryRange, MarketDataProvider, MarketFetch};
use finpulse_core::ingest::yahoo::YahooFinanceClient;
use finpulse_core::scoring::{FullScoring, Recommendation, Scores, ScoringStrategy};
use finpulse_core::storage::{PgStore, Store};

const DEFAULT_PORT: u16 = 5000;
const RECENT_NEWS_LIMIT: i64 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let store: Option<Arc<dyn Store>> = match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(db_url)
            .await
        {
            Ok(pool) => match finpulse_core::storage::migrate(&pool).await {
                Ok(()) => Some(Arc::new(PgStore::new(pool)) as Arc<dyn Store>),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; starting API in degraded mode");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    };

    let state = AppState {
        store,
        market: Arc::new(YahooFinanceClient::from_settings(&settings)?),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/screen/:ticker", get(screen_stock))
        .route("/sentiment/:ticker", get(get_sentiment))
        .route("/data/:ticker", get(get_stock_data))
        .route("/stocks", get(get_all_stocks))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = settings.port.unwrap_or(DEFAULT_PORT);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Clone)]
struct AppState {
    store: Option<Arc<dyn Store>>,
    market: Arc<dyn MarketDataProvider>,
}

impl AppState {
    fn store(&self) -> Result<&dyn Store, StatusCode> {
        self.store
            .as_deref()
            .ok_or(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Serialize, PartialEq)]
struct ScreenScores {
    garp_score: i32,
    growth_score: i32,
    value_score: i32,
    pe_ratio: f64,
    peg_ratio: f64,
    price_to_book: f64,
    roe: f64,
    revenue_growth: f64,
}

impl ScreenScores {
    fn new(scores: Scores, f: &Fundamentals) -> Self {
        Self {
            garp_score: scores.garp,
            growth_score: scores.growth,
            value_score: scores.value,
            pe_ratio: f.pe_ratio,
            peg_ratio: f.peg_ratio,
            price_to_book: f.price_to_book,
            roe: f.roe,
            revenue_growth: f.revenue_growth,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct ScreenResponse {
    ticker: String,
    company_name: String,
    current_price: f64,
    #[serde(rename = "52_week_high")]
    week_52_high: f64,
    #[serde(rename = "52_week_low")]
    week_52_low: f64,
    scores: ScreenScores,
    recommendation: Recommendation,
    last_updated: DateTime<Utc>,
}

/// Scores a one-year snapshot with the full formula. `None` when there are no bars.
fn screen_snapshot(
    snapshot: &MarketSnapshot,
    strategy: &dyn ScoringStrategy,
    now: DateTime<Utc>,
) -> Option<(StockRecord, ScreenResponse)> {
    let scores = strategy.score(&snapshot.fundamentals);
    let record = StockRecord::from_snapshot(snapshot, scores, now)?;
    let history = &snapshot.history;

    let response = ScreenResponse {
        ticker: snapshot.ticker.clone(),
        company_name: snapshot.company_name.clone(),
        current_price: round_to(record.current_price, 2),
        week_52_high: round_to(history.high()?, 2),
        week_52_low: round_to(history.low()?, 2),
        scores: ScreenScores::new(scores, &snapshot.fundamentals),
        recommendation: scores.recommendation(),
        last_updated: now,
    };
    Some((record, response))
}

async fn screen_stock(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ScreenResponse>, StatusCode> {
    let ticker = canonical_ticker(&ticker).ok_or(StatusCode::BAD_REQUEST)?;

    let fetched = state
        .market
        .fetch(&ticker, HistoryRange::OneYear)
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(%ticker, error = %e, "screen fetch failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let MarketFetch::Found(snapshot) = fetched else {
        return Err(StatusCode::NOT_FOUND);
    };

    let (record, response) =
        screen_snapshot(&snapshot, &FullScoring, Utc::now()).ok_or(StatusCode::NOT_FOUND)?;

    // The screen still answers when the snapshot can't be stored.
    match state.store() {
        Ok(store) => {
            if let Err(e) = store.upsert_stock(&record).await {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(%ticker, error = %e, "screen upsert failed");
            }
        }
        Err(_) => tracing::warn!(%ticker, "no database; screen result not stored"),
    }

    Ok(Json(response))
}

#[derive(Debug, Serialize, PartialEq)]
struct NewsEntry {
    headline: String,
    sentiment_score: f64,
    published_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, PartialEq)]
struct SentimentResponse {
    ticker: String,
    sentiment: SentimentSummary,
    recent_news: Vec<NewsEntry>,
}

fn sentiment_response(ticker: String, items: Vec<NewsItem>) -> SentimentResponse {
    let sentiment = SentimentSummary::from_items(&items);
    let recent_news = items
        .into_iter()
        .map(|n| NewsEntry {
            headline: n.headline,
            sentiment_score: round_to(n.sentiment_score, 3),
            published_at: n.published_at,
        })
        .collect();

    SentimentResponse {
        ticker,
        sentiment,
        recent_news,
    }
}

async fn get_sentiment(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<SentimentResponse>, StatusCode> {
    let store = state.store()?;
    let ticker = canonical_ticker(&ticker).ok_or(StatusCode::BAD_REQUEST)?;

    let items = store
        .recent_news(&ticker, RECENT_NEWS_LIMIT)
        .await
        .map_err(internal_error)?;

    Ok(Json(sentiment_response(ticker, items)))
}

async fn get_stock_data(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<StockRecord>, StatusCode> {
    let store = state.store()?;
    let ticker = canonical_ticker(&ticker).ok_or(StatusCode::BAD_REQUEST)?;

    let stock = store
        .get_stock(&ticker)
        .await
        .map_err(internal_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(stock))
}

async fn get_all_stocks(
    State(state): State<AppState>,
) -> Result<Json<Vec<StockRecord>>, StatusCode> {
    let store = state.store()?;
    let stocks = store.list_stocks().await.map_err(internal_error)?;
    Ok(Json(stocks))
}

fn internal_error(e: anyhow::Error) -> StatusCode {
    sentry_anyhow::capture_anyhow(&e);
    tracing::error!(error = %e, "store read failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

fn round_to(v: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (v * factor).round() / factor
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
