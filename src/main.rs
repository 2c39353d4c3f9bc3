use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use svcmap::cache::{MetadataStore, Snapshot};
use svcmap::config::Cli;
use svcmap::k8s::KubeClusterConnector;
use svcmap::metadata::MetadataLookupService;
use svcmap::metrics::ApiStats;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting svcmap-server v{}", svcmap::VERSION);

    let config = cli.server_config()?;

    let store = MetadataStore::new();
    match &config.snapshot {
        Some(path) => {
            let raw = std::fs::read(path)
                .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
            let snapshot: Snapshot = serde_json::from_slice(&raw)
                .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
            store.load_snapshot(snapshot);
            store.mark_synced();
        }
        None => warn!("No snapshot given; lookups fail until the cache is synced"),
    }

    let stats = ApiStats::new().context("Failed to register metrics")?;
    let lookup = MetadataLookupService::new(
        Arc::new(store),
        Arc::new(KubeClusterConnector::new()),
        stats,
    )
    .with_node_page_size(config.node_page_size);

    svcmap::api::serve(config.bind_address, svcmap::api::router(Arc::new(lookup)))
        .await
        .context("Metadata API server failed")?;

    Ok(())
}
