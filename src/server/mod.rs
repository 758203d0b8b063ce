//! HTTP surface: extraction, spreadsheet export, and script-based conversion.

pub mod handlers;
pub mod response;

pub use handlers::*;
pub use response::{OUTCOME_HEADER, ResponseKind};

use crate::bridge::{Bridge, BridgeConfig};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Server settings, usually built from command-line flags.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub bridge: BridgeConfig,
    pub max_upload_bytes: usize,
    /// Include diagnostic `details` in error bodies (development only).
    pub expose_details: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_owned(),
            bridge: BridgeConfig::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            expose_details: false,
        }
    }
}

/// State shared by all handlers. Nothing in it is mutable.
#[derive(Debug, Clone)]
pub struct AppState {
    pub bridge: Bridge,
    pub max_upload_bytes: usize,
    pub expose_details: bool,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            bridge: Bridge::new(config.bridge.clone()),
            max_upload_bytes: config.max_upload_bytes,
            expose_details: config.expose_details,
        }
    }
}

/// Build the API router with all endpoints
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/health", get(health_check))
        .route("/api/extract", post(extract_text))
        .route("/api/convert-to-excel", post(convert_to_excel))
        .route("/api/python-extract", post(python_extract))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `config.addr` and serve until Ctrl-C.
pub async fn start_server(config: &ServerConfig) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(&config.addr).await?;
    info!("Starting API server on {}", listener.local_addr()?);
    info!(
        interpreter = %config.bridge.interpreter,
        script = %config.bridge.script.display(),
        timeout_secs = config.bridge.timeout.as_secs(),
        "script bridge configured"
    );

    serve(listener, AppState::from_config(config), shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(signal_error) => {
            error!("failed to listen for shutdown signal: {signal_error}");
            std::future::pending::<()>().await;
        }
    }
}
