//! Library Catalog server

use library_catalog::{api, core, cover, db};

use anyhow::Result;
use std::sync::Arc;
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

    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Starting Library Catalog v{}", library_catalog::VERSION);
    info!(
        host = %config.server.host,
        port = config.server.port,
        static_dir = ?config.server.static_dir,
        "Server configuration"
    );
    info!(
        enabled = config.cover_lookup.enabled,
        base_url = %config.cover_lookup.base_url,
        "Cover lookup configuration"
    );

    // Opening the database also applies pending migrations
    let db = Arc::new(db::DatabaseManager::new(
        &config.database.path,
        config.database.connection_pool_size,
        config.database.busy_timeout(),
    )?);
    info!(
        path = %db.db_path().display(),
        pool_size = db.pool_size(),
        "Database initialized successfully"
    );

    let cover_lookup = cover::from_config(&config.cover_lookup)?;

    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(config, db, cover_lookup);
    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
