//! Metadata lookup service
//!
//! Composes the metadata cache and the cluster client into the three
//! lookups served by the API. Each lookup classifies collaborator failures
//! with its own policy:
//! - pod: a cache error is a hard failure
//! - node: a cache error is logged and leaves nothing to render
//! - cluster: a connect error is a hard failure, an aggregation error
//!   still carries the partial bundle

use crate::cache::MetadataCache;
use crate::metadata::cluster::{compute_cluster_bundle, ClusterConnector};
use crate::metadata::{ClusterBundle, NodeBundle, TagSet};
use crate::metrics::{ApiStats, Operation};
use crate::SvcmapError;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const DEFAULT_NODE_PAGE_SIZE: u32 = 500;

/// Result of a single-pod lookup
#[derive(Debug)]
pub enum PodLookup {
    Found(TagSet),
    /// No entry, or an entry without tags
    NotFound(String),
    CacheError(SvcmapError),
}

/// Result of a node bundle lookup. `bundle` is `None` when nothing could
/// be read, whether the node is uncached or the read failed.
#[derive(Debug)]
pub struct NodeLookup {
    pub bundle: Option<NodeBundle>,
    pub error: Option<SvcmapError>,
}

/// Result of a cluster-wide lookup
#[derive(Debug)]
pub enum ClusterLookup {
    /// No handle on the cluster API could be obtained
    ClientUnavailable(SvcmapError),
    /// Aggregation ran. With `error` set the bundle is partial and carries
    /// the error text.
    Computed {
        bundle: ClusterBundle,
        error: Option<SvcmapError>,
    },
}

pub struct MetadataLookupService {
    cache: Arc<dyn MetadataCache>,
    connector: Arc<dyn ClusterConnector>,
    stats: ApiStats,
    node_page_size: u32,
}

impl MetadataLookupService {
    pub fn new(
        cache: Arc<dyn MetadataCache>,
        connector: Arc<dyn ClusterConnector>,
        stats: ApiStats,
    ) -> Self {
        Self {
            cache,
            connector,
            stats,
            node_page_size: DEFAULT_NODE_PAGE_SIZE,
        }
    }

    pub fn with_node_page_size(mut self, node_page_size: u32) -> Self {
        self.node_page_size = node_page_size;
        self
    }

    pub fn stats(&self) -> &ApiStats {
        &self.stats
    }

    /// Tags of one pod, as used by node agents to enrich their telemetry
    pub fn pod_tags(&self, node: &str, namespace: &str, pod: &str) -> PodLookup {
        self.stats.increment_requests(Operation::Pod);

        match self.cache.pod_tags(node, namespace, pod) {
            Ok(Some(tags)) if !tags.is_empty() => PodLookup::Found(tags),
            Ok(_) => {
                debug!(node, namespace, pod, "No cached metadata for pod");
                PodLookup::NotFound(format!(
                    "no cached metadata found for the pod {} on the node {}",
                    pod, node
                ))
            }
            Err(e) => {
                error!(
                    node,
                    namespace,
                    pod,
                    "Could not retrieve the metadata of the pod from the cache: {}",
                    e
                );
                self.stats.increment_errors(Operation::Pod);
                PodLookup::CacheError(e)
            }
        }
    }

    /// Tags of every pod on one node
    pub fn node_bundle(&self, node: &str) -> NodeLookup {
        self.stats.increment_requests(Operation::Node);
        info!("Fetching metadata map on all pods of the node {}", node);

        match self.cache.node_bundle(node) {
            Ok(bundle) => {
                if bundle.is_none() {
                    debug!(node, "Node is not present in the metadata cache");
                }
                NodeLookup {
                    bundle,
                    error: None,
                }
            }
            Err(e) => {
                error!(node, "Could not collect the service map: {}", e);
                self.stats.increment_errors(Operation::Node);
                NodeLookup {
                    bundle: None,
                    error: Some(e),
                }
            }
        }
    }

    /// Tags of every pod on every node the cluster API knows about
    pub async fn cluster_bundle(&self) -> ClusterLookup {
        self.stats.increment_requests(Operation::Cluster);
        info!("Computing metadata map on all nodes");

        let client = match self.connector.connect().await {
            Ok(client) => client,
            Err(e) => {
                error!("Can't create client to query the API Server: {}", e);
                self.stats.increment_errors(Operation::Cluster);
                return ClusterLookup::ClientUnavailable(e);
            }
        };

        let (mut bundle, error) =
            compute_cluster_bundle(client.as_ref(), self.cache.as_ref(), self.node_page_size)
                .await;

        if let Some(e) = &error {
            error!(
                "There was an error querying the nodes from the API: {} ({} nodes collected)",
                e,
                bundle.node_count()
            );
            self.stats.increment_errors(Operation::Cluster);
            bundle.set_error(e.to_string());
        }

        ClusterLookup::Computed { bundle, error }
    }
}
