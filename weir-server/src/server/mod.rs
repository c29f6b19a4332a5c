mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use weir_core::{SelectionStore, SelectorConfig};

use handlers::{healthz, select_shard};

/// Shared state of the HTTP surface: the published selections and the
/// validated configuration they were computed from.
pub(crate) struct AppState {
    pub(crate) store: Arc<SelectionStore>,
    pub(crate) config: Arc<SelectorConfig>,
}

// API endpoints
// - GET /select_shard?type={request_type}
//   Least-loaded shard for the request type, answered from the most recently
//   published selections. 400 when the type parameter is missing/empty or
//   names an unknown request type, 404 while nothing is published yet.
//
// - GET /healthz
//   Liveness plus publication freshness: number of published request types,
//   the newest publication timestamp, and a staleness flag.
//
pub(crate) fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/select_shard", get(select_shard))
        .route("/healthz", get(healthz))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub(crate) async fn run(
    listen_addr: SocketAddr,
    app_state: Arc<AppState>,
    cancel: CancellationToken,
) -> Result<()> {
    let router = build_router(app_state);

    info!("Starting HTTP server on {}", listen_addr);
    let listener = TcpListener::bind(listen_addr).await?;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C and cancels the refresher so it stops with the server.
async fn shutdown_signal(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received, stopping refresher");
    cancel.cancel();
}
