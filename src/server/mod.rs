//! HTTP transport - axum server exposing key and structure analysis
//!
//! Uploads are decoded in memory and analyzed on the blocking pool. A
//! semaphore bounds how many analyses run at once; each one carries a
//! deadline on its cancel token so a slow upload cannot hold a permit
//! forever.

pub mod routes;

use crate::config::ServerSettings;
use crate::error::{MixmapError, Result};
use crate::pipeline::TrackAnalyzer;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::Router;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared state for all handlers
pub struct AppState {
    pub settings: ServerSettings,
    pub analyzer: TrackAnalyzer,
    /// One permit per analysis allowed to run concurrently
    pub permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(settings: ServerSettings) -> Self {
        let analyzer = TrackAnalyzer::new(&settings.analysis);
        let permits = Arc::new(Semaphore::new(settings.max_concurrent.max(1)));
        Self {
            settings,
            analyzer,
            permits,
        }
    }
}

/// Build the application router with CORS and the upload size limit
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);
    let body_limit = DefaultBodyLimit::max(state.settings.max_upload_bytes);

    routes::api_routes()
        .layer(body_limit)
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(settings: ServerSettings) -> Result<()> {
    settings
        .analysis
        .validate()
        .map_err(MixmapError::ConfigError)?;

    let bind = settings.bind;
    let max_concurrent = settings.max_concurrent;
    let app = router(Arc::new(AppState::new(settings)));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| MixmapError::ServerError(format!("Failed to bind to {}: {}", bind, e)))?;
    let addr = listener
        .local_addr()
        .map_err(|e| MixmapError::ServerError(format!("Failed to get local addr: {}", e)))?;

    info!(
        "Listening on http://{} ({} concurrent analyses)",
        addr, max_concurrent
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MixmapError::ServerError(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received, draining connections...");
    }
}
