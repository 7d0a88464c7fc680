//! QuoteBoard Server Binary
//!
//! Serves cached currency quotes and derived statistics over HTTP, with a
//! background task refreshing the cache on a fixed interval.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quoteboard_common::time;
use quoteboard_engine::{EngineConfig, QuoteEngine};
use quoteboard_server::{create_router, ServerConfig};
use quoteboard_store::QuoteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    // Initialize logging; RUST_LOG overrides the configured level.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting QuoteBoard server");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    // Persistence sink
    let store = Arc::new(QuoteStore::connect(&config.database_url).await?);

    // Quote engine over the default source set
    let engine_config = EngineConfig::default();
    let sources = quoteboard_sources::default_sources(engine_config.source_timeout)?;
    let engine = Arc::new(QuoteEngine::new(sources, Some(store), engine_config));

    // Scheduled refresh; the first tick fires immediately, covering the
    // initial fetch. On-demand read triggers collapse into the same
    // single-flight guard.
    let refresher = engine.clone();
    let refresh_interval = config.refresh_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(refresh_interval);
        loop {
            ticker.tick().await;
            refresher.refresh().await;
        }
    });

    let app = create_router(engine);
    let addr = format!("{}:{}", config.listen_addr, config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        listen_addr = %addr,
        database_url = %config.database_url,
        refresh_interval_secs = refresh_interval.as_secs(),
        freshness_window_secs = time::constants::freshness_window().num_seconds(),
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
    info!("Shutdown signal received");
}
