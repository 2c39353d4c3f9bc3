//! HTTP surface of the metadata service
//!
//! Routes:
//! - `GET /api/v1/metadata/:node_name/:ns/:pod_name` - tags of one pod
//! - `GET /api/v1/metadata/:node_name` - tags of every pod on a node
//! - `GET /api/v1/metadata` - tags of every pod on every node
//! - `GET /metrics` - request and error counters

pub mod encoding;
pub mod handlers;

use crate::metadata::MetadataLookupService;
use crate::metrics::PrometheusExporter;
use crate::Result;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<MetadataLookupService>,
    pub exporter: PrometheusExporter,
}

impl AppState {
    pub fn new(lookup: Arc<MetadataLookupService>) -> Self {
        let exporter = PrometheusExporter::new(lookup.stats().clone());
        Self { lookup, exporter }
    }
}

/// Build the full router
pub fn router(lookup: Arc<MetadataLookupService>) -> Router {
    Router::new()
        .nest("/api/v1", install_v1())
        .route("/metrics", get(handlers::get_metrics))
        .with_state(AppState::new(lookup))
}

/// v1 metadata endpoints
fn install_v1() -> Router<AppState> {
    Router::new()
        .route(
            "/metadata/:node_name/:ns/:pod_name",
            get(handlers::get_pod_metadata),
        )
        .route("/metadata/:node_name", get(handlers::get_node_metadata))
        .route("/metadata", get(handlers::get_all_metadata))
}

/// Serve the router until Ctrl+C or SIGTERM
pub async fn serve(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Metadata API listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Metadata API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
