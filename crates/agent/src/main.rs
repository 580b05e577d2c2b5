//! Relay agent entry point
//!
//! Loads configuration, initialises logging, wires the service graph
//! and runs the per-category workers until Ctrl-C.

mod app;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::app::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; a missing file is not an error
    let dotenv_path = dotenvy::dotenv().ok();

    // The chosen config path is logged once the subscriber is up
    let config_path = exrelay_infra::config::resolve_path();
    let config = exrelay_infra::config::load_from_file(config_path.clone())
        .context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.agent.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(path) = dotenv_path {
        tracing::info!(path = %path.display(), "Loaded environment overrides");
    }
    if let Some(path) = &config_path {
        tracing::info!(path = %path.display(), "Loaded configuration file");
    }
    tracing::info!(
        categories = config.categories.len(),
        sync_interval_seconds = config.agent.sync_interval_seconds,
        "Configuration loaded"
    );

    let app = App::bootstrap(config).await.context("failed to bootstrap the relay agent")?;
    app.run().await.context("relay agent terminated with an error")?;

    tracing::info!("Relay agent stopped");
    Ok(())
}
