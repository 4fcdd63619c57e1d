// =============================================================================
// NSE Technicals Dashboard — Main Entry Point
// =============================================================================
//
// One-shot mode (default): fetch every configured symbol, print the table (or
// JSON) to stdout, exit.
// Serve mode: rebuild the snapshot every `refresh_secs` and expose it over
// HTTP until Ctrl+C.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nse_technicals::api;
use nse_technicals::app_state::AppState;
use nse_technicals::dashboard::Dashboard;
use nse_technicals::market_data::{FixedHistoryProvider, PriceHistoryProvider, YahooFinanceProvider};
use nse_technicals::render::{render_snapshot, JsonRenderer, TableRenderer, TextTableRenderer};
use nse_technicals::runtime_config::{OutputFormat, RuntimeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    // Logs go to stderr; stdout carries the rendered dashboard.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path =
        std::env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| "runtime_config.json".into());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config
        .apply_overrides(|key| std::env::var(key).ok())
        .context("invalid environment override")?;

    info!(
        symbols = config.symbols.len(),
        lookback_days = config.lookback_days,
        serve = config.serve,
        output = %config.output_format,
        "Configuration ready"
    );

    // ── 2. Price-history provider ────────────────────────────────────────
    let provider: Arc<dyn PriceHistoryProvider> = match &config.history_file {
        Some(path) => Arc::new(FixedHistoryProvider::load_json(path)?),
        None => Arc::new(YahooFinanceProvider::new(Duration::from_secs(
            config.request_timeout_secs,
        ))?),
    };

    let config = Arc::new(config);
    let dashboard = Dashboard::new(provider, config.clone());

    if !config.serve {
        // ── 3a. One-shot ─────────────────────────────────────────────────
        let snapshot = dashboard.build_snapshot().await;
        let stdout = std::io::stdout().lock();
        let mut renderer: Box<dyn TableRenderer> = match config.output_format {
            OutputFormat::Table => Box::new(TextTableRenderer::new(stdout)),
            OutputFormat::Json => Box::new(JsonRenderer::new(stdout)),
        };
        render_snapshot(renderer.as_mut(), &snapshot)?;
        return Ok(());
    }

    // ── 3b. Serve ────────────────────────────────────────────────────────
    let state = Arc::new(AppState::new(dashboard));

    let refresh_state = state.clone();
    let refresh_every = Duration::from_secs(config.refresh_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_every);
        loop {
            interval.tick().await;
            refresh_state.refresh().await;
        }
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "API server listening");

    let app = api::rest::router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("Shutdown signal received, stopping API server");
        })
        .await
        .context("API server failed")?;

    info!("Dashboard server shut down.");
    Ok(())
}
