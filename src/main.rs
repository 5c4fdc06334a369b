//! fleet-tracker server entry point.
//!
//! Loads configuration, opens the selected storage backend and serves the
//! REST API.

use tracing_subscriber::EnvFilter;

use fleet_tracker::api;
use fleet_tracker::app_state::AppState;
use fleet_tracker::config::{LogFormat, TrackerConfig};
use fleet_tracker::persistence;
use fleet_tracker::service::FleetService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = TrackerConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(
        addr = %config.listen_addr,
        backend = %config.storage_backend,
        "starting fleet-tracker"
    );

    // Build storage and service layers
    let storage = persistence::open(&config).await?;
    let fleet_service = FleetService::new(storage, config.password_hash_cost);

    // Build router
    let app = api::app(AppState::new(fleet_service));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
