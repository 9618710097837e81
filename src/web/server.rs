//! HTTP server setup

use super::handlers;
use crate::config::AppConfig;
use crate::core::CardAnalysisPipeline;
use crate::domain::{CardScanError, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub pipeline: CardAnalysisPipeline,
    /// Shows the debug banner
    pub debug: bool,
}

/// Build the router with all routes and layers
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/analyze", post(handlers::analyze))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` flips to `true`
///
/// In-flight requests are allowed to finish before this returns.
///
/// # Errors
///
/// Returns an error if the address is invalid, cannot be bound, or the server
/// fails while running.
pub async fn serve(
    config: &AppConfig,
    pipeline: CardAnalysisPipeline,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let addr: SocketAddr = config.server.bind_addr.parse().map_err(|e| {
        CardScanError::Configuration(format!(
            "Invalid bind address '{}': {e}",
            config.server.bind_addr
        ))
    })?;

    let state = AppState {
        pipeline,
        debug: config.application.debug,
    };
    let app = build_router(state, config.server.max_upload_bytes());

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %addr,
        max_upload_mb = config.server.max_upload_mb,
        debug = config.application.debug,
        "HTTP server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            // A dropped sender also ends the server
            let _ = shutdown.wait_for(|stop| *stop).await;
            tracing::info!("Shutting down HTTP server");
        })
        .await?;

    Ok(())
}
