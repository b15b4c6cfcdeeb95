use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// Import modules
mod basemaps;
mod classifier;
mod composer;
mod constants;
mod feed;
mod layer;
mod legend;
mod server;
mod session;
mod settings;
mod stylist;

use feed::HttpFeedSource;
use server::{start_server, AppState};
use settings::Settings;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quakemap=info,tower_http=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    info!("🌍 QuakeMap v{} starting...", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load().context("Failed to load settings")?;
    info!("⚙️  Config file: {}", Settings::config_path().display());
    if settings.access_token.is_none() {
        warn!(
            "No tile access token found; set access_token in quakemap.ini or {}",
            constants::ACCESS_TOKEN_ENV
        );
    }

    let source = HttpFeedSource::new(settings.fetch_timeout())
        .context("Failed to create HTTP client")?;

    info!("📡 Fetching earthquakes from {}", settings.event_feed_url);
    info!("📡 Fetching plate boundaries from {}", settings.boundary_feed_url);
    let viewport = session::load_viewport(Arc::new(source), &settings).await;

    for notice in &viewport.notices {
        warn!("⚠️  {}", notice);
    }

    let state = AppState::new(viewport, settings)?;
    start_server(state).await?;

    Ok(())
}
