//! HTTP Server implementation
//!
//! This module provides the HTTP server using Axum framework with:
//! - Configurable host/port binding
//! - Graceful shutdown handling
//! - Request timeouts
//! - Health check endpoint
//! - Static pages served as the fallback

use crate::api::handlers::AppState;
use crate::api::middleware::trace_id_middleware;
use crate::api::routes::build_api_routes;
use crate::core::config::ServerConfig;
use crate::core::services::CatalogService;
use crate::core::Config;
use crate::cover::CoverLookup;
use crate::db::manager::DatabaseManager;
use crate::db::repository::{AuthorRepository, BookRepository};
use axum::{middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// HTTP API Server
pub struct ApiServer {
    router: Router,
    config: ServerConfig,
}

impl ApiServer {
    /// Create a new API server over the given database and cover lookup
    pub fn new(config: Config, db: Arc<DatabaseManager>, cover_lookup: Arc<dyn CoverLookup>) -> Self {
        let router = Self::build_router(&config, db, cover_lookup);

        Self {
            router,
            config: config.server,
        }
    }

    fn build_router(
        config: &Config,
        db: Arc<DatabaseManager>,
        cover_lookup: Arc<dyn CoverLookup>,
    ) -> Router {
        let author_repo = Arc::new(AuthorRepository::new(db.clone()));
        let book_repo = Arc::new(BookRepository::new(db));
        let catalog = Arc::new(
            CatalogService::new(author_repo, book_repo, cover_lookup)
                .with_listing_budget(config.cover_lookup.listing_budget()),
        );
        let config = &config.server;

        let app_state = AppState { catalog };

        if !config.static_dir.is_dir() {
            warn!(static_dir = %config.static_dir.display(), "Static directory not found; HTML pages unavailable");
        }
        let serve_dir = ServeDir::new(&config.static_dir);

        Router::new()
            .route("/health", get(health_check))
            .merge(build_api_routes(app_state, &config.static_dir))
            .fallback_service(serve_dir)
            .layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn(trace_id_middleware))
                    .layer(TraceLayer::new_for_http())
                    .layer(
                        CorsLayer::new()
                            .allow_origin(Any)
                            .allow_methods(Any)
                            .allow_headers(Any),
                    )
                    .layer(TimeoutLayer::new(config.request_timeout())),
            )
    }

    /// Start the HTTP server and listen for requests
    ///
    /// This method will block until the server is shut down gracefully.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr.parse()?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            request_timeout = self.config.request_timeout,
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;

        info!(addr = %socket_addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server shut down gracefully");

        Ok(())
    }

    /// Get a reference to the router
    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Initiating graceful shutdown...");
}
