// =============================================================================
// tickerdeck -- equity market-data facade
// =============================================================================
//
// Polls a market-data provider for a fixed set of tickers, caches the latest
// snapshot in memory, and re-exposes quotes, historical series and technical
// indicators as JSON endpoints for the dashboard frontend.
// =============================================================================

mod api;
mod app_state;
mod fanout;
mod indicators;
mod provider;
mod refresher;
mod runtime_config;
mod types;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::provider::YahooClient;
use crate::runtime_config::RuntimeConfig;

const CONFIG_PATH: &str = "tickerdeck.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Override symbols and bind address from env if available.
    if let Ok(syms) = std::env::var("TICKERDECK_SYMBOLS") {
        let parsed: Vec<String> = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !parsed.is_empty() {
            config.symbols = parsed;
        }
    }
    if let Ok(addr) = std::env::var("TICKERDECK_BIND_ADDR") {
        config.bind_addr = addr;
    }

    info!(
        symbols = config.symbols.len(),
        poll_interval_secs = config.poll_interval_secs,
        max_inflight_fetches = config.max_inflight_fetches,
        "tickerdeck starting"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let provider = Arc::new(YahooClient::new());
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, provider));

    // ── 3. Start the cache refresher ─────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher_handle = tokio::spawn(refresher::run(state.clone(), shutdown_rx));

    // ── 4. Start the API server ──────────────────────────────────────────
    let api_state = state.clone();
    let bind_addr_clone = bind_addr.clone();

    tokio::spawn(async move {
        let app = api::rest::router(api_state);
        let listener = tokio::net::TcpListener::bind(&bind_addr_clone)
            .await
            .expect("Failed to bind API server");
        info!(addr = %bind_addr_clone, "API server listening");
        axum::serve(listener, app)
            .await
            .expect("API server failed");
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    if shutdown_tx.send(true).is_ok() {
        // Let the refresher finish an in-flight cycle before exiting.
        if let Err(e) = refresher_handle.await {
            warn!(error = %e, "refresher task did not shut down cleanly");
        }
    }

    // Persist any runtime changes (env overrides included) across restarts.
    if let Err(e) = state.runtime_config.read().save(CONFIG_PATH) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("tickerdeck shut down complete.");
    Ok(())
}
