use std::sync::Arc;
use std::time::Duration;

use airing_agent::{router, AgentConfig, AppState, CommandHandler, Timers, WatchEngine};
use airing_core::{Clock, KeyValueStore, SystemClock};
use anilist_client::CatalogClient;
use anyhow::{Context, Result};
use notification_service::{DisplayChannels, NotificationScheduler};
use tokio::signal::unix::SignalKind;
use watchlist_store::{SettingsStore, SqliteKvStore, WatchlistStore};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m.max(1) * 60)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    tracing::info!("Starting airing agent");

    let config = AgentConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Catalog: {}", config.api_url);
    tracing::info!(
        "  Rate limit: {} requests / {} ms",
        config.rate_limit,
        config.rate_window_ms
    );
    tracing::info!("  Database: {}", config.database_url);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let kv: Arc<dyn KeyValueStore> = Arc::new(
        SqliteKvStore::connect(&config.database_url)
            .await
            .context("Failed to open key-value store")?,
    );
    let settings = Arc::new(SettingsStore::new(kv.clone()));
    if settings.seed_defaults().await? {
        tracing::info!("First run: default settings written");
    }
    let watchlist = Arc::new(WatchlistStore::new(kv, clock.clone()));

    let client = Arc::new(
        CatalogClient::connect(&config.client_config(), clock.clone())
            .context("Failed to build catalog client")?,
    );

    let display = Arc::new(DisplayChannels::new(config.discord_webhook_url.as_deref()));
    let scheduler = Arc::new(
        NotificationScheduler::new(display, clock).with_fallback_icon(config.fallback_icon.clone()),
    );

    let engine = Arc::new(WatchEngine::new(client, watchlist, settings.clone(), scheduler));
    let commands = Arc::new(CommandHandler::new(engine.clone()));

    // Control surface
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Control API listening on {}", config.bind_addr);
    let app = router(AppState::new(commands));
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Control API stopped: {}", e);
        }
    });

    let refresh_minutes = match config.refresh_interval_minutes {
        Some(m) => m,
        None => u64::from(settings.get().await?.updates.frequency),
    };
    let cycles = engine.clone();
    let timers = Timers::arm(
        minutes(refresh_minutes),
        minutes(config.notify_interval_minutes),
        move |timer| {
            let engine = cycles.clone();
            async move { engine.run_cycle(timer).await }
        },
    );

    // Graceful shutdown (SIGINT + SIGTERM)
    let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT");
        }
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM");
        }
    }
    tracing::info!("Shutdown signal received, exiting gracefully...");

    timers.shutdown();
    server.abort();
    tracing::info!("Airing agent shut down.");
    Ok(())
}
