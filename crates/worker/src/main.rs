use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use finpulse_core::config::Settings;
use finpulse_core::ingest::yahoo::YahooFinanceClient;
use finpulse_core::news::html::SelectorHeadlineExtractor;
use finpulse_core::news::sentiment::LexiconSentimentScorer;
use finpulse_core::news::source::YahooNewsSource;
use finpulse_core::news::NewsCollector;
use finpulse_core::scoring::QuickScoring;
use finpulse_core::storage::memory::MemoryStore;
use finpulse_core::storage::{PgStore, Store};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cycle;
mod retention;
mod schedule;
mod universe;

#[cfg(test)]
mod testing;

#[derive(Debug, Parser)]
#[command(name = "finpulse_worker")]
struct Args {
    /// Run a single cycle and exit.
    #[arg(long)]
    once: bool,

    /// Keep results in memory instead of writing to the database.
    #[arg(long)]
    dry_run: bool,

    /// Seconds between cycles. Overrides WORKER_INTERVAL.
    #[arg(long)]
    interval_secs: Option<u64>,
}

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

    let args = Args::parse();
    let interval = args
        .interval_secs
        .map(Duration::from_secs)
        .unwrap_or(settings.worker_interval);

    tracing::info!(
        ?interval,
        poll = ?settings.worker_poll,
        dry_run = args.dry_run,
        once = args.once,
        "finpulse worker starting"
    );

    let store = build_store(&settings, args.dry_run).await?;
    let orchestrator = Arc::new(build_orchestrator(&settings, store)?);

    if args.once {
        let report = orchestrator.run_cycle(chrono::Utc::now()).await;
        tracing::info!(?report, "single cycle finished");
        return Ok(());
    }

    let timing = schedule::LoopTiming {
        poll: settings.worker_poll,
        error_backoff: settings.worker_error_backoff,
    };

    schedule::run_loop(
        schedule::CycleSchedule::new(interval),
        timing,
        move || {
            let orchestrator = orchestrator.clone();
            async move { orchestrator.run_cycle(chrono::Utc::now()).await }
        },
        shutdown_signal(),
    )
    .await;

    Ok(())
}

async fn build_store(settings: &Settings, dry_run: bool) -> anyhow::Result<Arc<dyn Store>> {
    if dry_run {
        tracing::info!("dry-run: using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let db_url = settings.require_database_url()?;

    // Lazy so an unreachable database degrades each operation instead of aborting start-up.
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy(db_url)
        .context("invalid DATABASE_URL")?;

    if let Err(err) = finpulse_core::storage::migrate(&pool).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %format!("{err:#}"), "db migrations failed; continuing");
    }

    Ok(Arc::new(PgStore::new(pool)))
}

fn build_orchestrator(
    settings: &Settings,
    store: Arc<dyn Store>,
) -> anyhow::Result<cycle::Orchestrator> {
    let market = YahooFinanceClient::from_settings(settings)?;
    let news = NewsCollector::new(
        Box::new(YahooNewsSource::from_settings(settings)?),
        Box::new(SelectorHeadlineExtractor::new(&settings.news_headline_selector)?),
        Box::new(LexiconSentimentScorer::default()),
    );

    Ok(cycle::Orchestrator::new(
        store,
        Arc::new(market),
        news,
        universe::TickerUniverse::new(&settings.default_tickers),
        Box::new(QuickScoring),
    )
    .with_ticker_delay(settings.ticker_delay)
    .with_news_max_items(settings.news_max_items))
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

/// Resolves when `signal` fires. If the handler cannot be installed the worker keeps running
/// until it is killed.
async fn wait_for_shutdown<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(err) = signal.await {
        tracing::error!(error = %err, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
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
