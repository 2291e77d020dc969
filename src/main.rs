use std::sync::Arc;

use botboard::charts::{ChartBackend, InMemoryCharts};
use botboard::dashboard::DashboardController;
use botboard::metrics::init_metrics;
use botboard::render::{mounts, LoggingSurface};
use botboard::services::Session;
use botboard::{ClientConfig, DashboardApi};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ClientConfig::from_env()?;
    init_tracing(config.log_json);

    // Install rustls crypto provider before any TLS connections
    rustls::crypto::ring::default_provider()
        .install_default()
        .ok();

    init_metrics(config.metrics_addr)?;

    let http = reqwest::Client::builder()
        .user_agent(concat!("botboard/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let api = DashboardApi::new(http, config.origin.clone());

    // --- Dashboard: one-shot composition ---
    let charts = Arc::new(InMemoryCharts::new());
    let backend: Arc<dyn ChartBackend> = charts.clone();
    let mut dashboard = DashboardController::new(
        api.clone(),
        Some(backend),
        LoggingSurface::new(),
        config.time_scale,
    );
    let outcome = dashboard.activate().await;
    tracing::info!(
        outcome = ?outcome,
        charts = charts.active_count(),
        "Dashboard composed"
    );
    tracing::debug!(charts = %charts.snapshot_json()?, "Mounted chart configurations");

    // --- Live session: push channel + poll loop ---
    let session = Session::start(&config, api, LoggingSurface::new())?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    let view = session.stop().await?;
    dashboard.teardown();
    tracing::info!(
        feed_items = view.feed.len(),
        status = ?view.status.status(),
        writes = view.surface.inner().writes(),
        leaderboard = view.surface.inner().content(mounts::MINI_LEADERBOARD).is_some(),
        "Bye"
    );

    Ok(())
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
