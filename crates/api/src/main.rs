//! Infra Monitor API - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    init_logging(&settings.logging)?;

    info!("=== Infra Monitor API v{} ===", env!("CARGO_PKG_VERSION"));
    if settings.slack.client_config().is_none() {
        info!("Slack credentials not set; POST /api/alert will answer 503");
    }

    run_server(settings).await
}
