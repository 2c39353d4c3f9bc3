//! Cluster-wide aggregation of node bundles
//!
//! Nodes are enumerated through a [`ClusterClient`] and each one is looked
//! up independently in the metadata cache. A node the cache cannot serve is
//! kept in the result with an inline error marker.

use crate::cache::MetadataCache;
use crate::metadata::{ClusterBundle, NodeEntry};
use crate::{Result, SvcmapError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// One page of node names returned by the cluster API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePage {
    pub names: Vec<String>,
    /// Token for the next page, `None` on the last one
    pub continue_token: Option<String>,
}

/// Handle on the cluster control-plane API
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn list_nodes(&self, limit: u32, continue_token: Option<String>) -> Result<NodePage>;
}

/// Produces [`ClusterClient`] handles, connecting on first use
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ClusterClient>>;
}

/// Build the bundle of every node the client can enumerate.
///
/// On failure the nodes gathered from earlier pages are returned alongside
/// the error instead of being discarded.
pub async fn compute_cluster_bundle(
    client: &dyn ClusterClient,
    cache: &dyn MetadataCache,
    page_size: u32,
) -> (ClusterBundle, Option<SvcmapError>) {
    let mut bundle = ClusterBundle::new();
    let mut continue_token = None;

    loop {
        let page = match client.list_nodes(page_size, continue_token.take()).await {
            Ok(page) => page,
            Err(e) => return (bundle, Some(e)),
        };

        debug!("Aggregating metadata of {} nodes", page.names.len());

        for node_name in page.names {
            let entry = match cache.node_bundle(&node_name) {
                Ok(Some(node_bundle)) => NodeEntry::Bundle(node_bundle),
                Ok(None) => NodeEntry::not_in_cache(&node_name),
                Err(e) => {
                    warn!(node = %node_name, "Could not read the node bundle: {}", e);
                    NodeEntry::Missing {
                        error: e.to_string(),
                    }
                }
            };
            bundle.insert(node_name, entry);
        }

        match page.continue_token {
            Some(token) if !token.is_empty() => continue_token = Some(token),
            _ => return (bundle, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MetadataStore;
    use std::sync::Mutex;

    /// Serves fixed pages, failing once the listed pages run out
    struct PagedClient {
        pages: Vec<NodePage>,
        failure: Option<String>,
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl ClusterClient for PagedClient {
        async fn list_nodes(&self, _limit: u32, continue_token: Option<String>) -> Result<NodePage> {
            let mut seen = self.seen_tokens.lock().unwrap();
            let index = seen.len();
            seen.push(continue_token);

            match (self.pages.get(index), &self.failure) {
                (Some(page), _) => Ok(page.clone()),
                (None, Some(message)) => Err(SvcmapError::ClusterQuery(message.clone())),
                (None, None) => Ok(NodePage::default()),
            }
        }
    }

    fn page(names: &[&str], token: Option<&str>) -> NodePage {
        NodePage {
            names: names.iter().map(|s| s.to_string()).collect(),
            continue_token: token.map(str::to_string),
        }
    }

    fn store() -> MetadataStore {
        let store = MetadataStore::new();
        store.set_pod_tags("node1", "default", "pod1", vec!["kube_service:svc1".to_string()]);
        store.set_pod_tags("node2", "default", "pod3", vec!["kube_service:svc1".to_string()]);
        store.mark_synced();
        store
    }

    #[tokio::test]
    async fn test_follows_continue_tokens() {
        let client = PagedClient {
            pages: vec![page(&["node1"], Some("next")), page(&["node2"], None)],
            failure: None,
            seen_tokens: Mutex::new(Vec::new()),
        };

        let (bundle, error) = compute_cluster_bundle(&client, &store(), 1).await;

        assert!(error.is_none());
        assert_eq!(bundle.node_count(), 2);
        assert_eq!(
            *client.seen_tokens.lock().unwrap(),
            vec![None, Some("next".to_string())]
        );
    }

    #[tokio::test]
    async fn test_uncached_node_gets_marker() {
        let client = PagedClient {
            pages: vec![page(&["node1", "node3"], None)],
            failure: None,
            seen_tokens: Mutex::new(Vec::new()),
        };

        let (bundle, error) = compute_cluster_bundle(&client, &store(), 500).await;

        assert!(error.is_none());
        assert!(bundle.get("node1").unwrap().bundle().is_some());
        assert_eq!(
            bundle.get("node3").unwrap(),
            &NodeEntry::not_in_cache("node3")
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_pages() {
        let client = PagedClient {
            pages: vec![page(&["node1"], Some("next"))],
            failure: Some("List nodes is not permitted at the cluster scope".to_string()),
            seen_tokens: Mutex::new(Vec::new()),
        };

        let (bundle, error) = compute_cluster_bundle(&client, &store(), 1).await;

        assert!(error.unwrap().to_string().contains("not permitted"));
        assert_eq!(bundle.node_count(), 1);
        assert!(bundle.get("node1").is_some());
    }

    #[tokio::test]
    async fn test_unsynced_cache_marks_every_node() {
        let client = PagedClient {
            pages: vec![page(&["node1", "node2"], None)],
            failure: None,
            seen_tokens: Mutex::new(Vec::new()),
        };
        let cold = MetadataStore::new();

        let (bundle, error) = compute_cluster_bundle(&client, &cold, 500).await;

        assert!(error.is_none());
        assert_eq!(bundle.node_count(), 2);
        assert!(bundle.nodes().all(|(_, entry)| entry.bundle().is_none()));
    }
}
