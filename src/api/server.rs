use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::handlers::{health_check, status, AppState};

/// Build the status router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the status endpoint until the task is aborted
pub async fn run_server(
    addr: &str,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = addr.parse()?;
    tracing::info!("Starting status server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
