//! Mangam Portal - Rust Implementation
//!
//! A gateway service for the Mangam catalog with a live mirror of the
//! server-side user directory.

use mangam_portal::{api, core};

use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging system based on configuration
    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Configuration loaded successfully");
    info!("Starting Mangam Portal v{}", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Server configuration"
    );
    info!(
        base_url = %config.backend.base_url,
        "Backend configuration"
    );
    let image_hosts: Vec<&str> = config
        .images
        .remote_patterns
        .iter()
        .map(|pattern| pattern.hostname.as_str())
        .collect();
    info!(
        allowed_hosts = ?image_hosts,
        "Remote image configuration"
    );

    // Initialize API server
    info!("Initializing HTTP server...");
    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(config)?;

    info!("Mangam Portal initialized successfully");
    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
