//! In-memory metadata store keyed by node name
//!
//! Holds the node -> (namespace, pod) -> tags mapping written by the
//! reconciliation process and implements [`MetadataCache`] on top of it.

use super::MetadataCache;
use crate::metadata::{NodeBundle, TagSet};
use crate::{Result, SvcmapError};
use dashmap::DashMap;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Namespace-qualified pod name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PodKey {
    pub namespace: String,
    pub name: String,
}

impl PodKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

/// Bulk form of the store: node -> namespace -> pod -> tags
pub type Snapshot = BTreeMap<String, BTreeMap<String, BTreeMap<String, TagSet>>>;

type NodeRecord = BTreeMap<PodKey, TagSet>;

/// Thread-safe store mapping node names to the tags of their pods
#[derive(Clone)]
pub struct MetadataStore {
    nodes: Arc<DashMap<String, NodeRecord>>,
    synced: Arc<AtomicBool>,
}

impl MetadataStore {
    /// Create an empty store that rejects reads until [`mark_synced`](Self::mark_synced)
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(DashMap::new()),
            synced: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal that the initial reconciliation pass has completed
    pub fn mark_synced(&self) {
        if !self.synced.swap(true, Ordering::AcqRel) {
            info!(
                "Metadata cache initial sync complete. Tracking {} nodes",
                self.nodes.len()
            );
        }
    }

    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    /// Make a node known to the cache, with no pods if it was absent
    pub fn register_node(&self, node: &str) {
        self.nodes.entry(node.to_string()).or_default();
    }

    /// Replace every pod mapping of a node
    pub fn set_node_pods(&self, node: &str, pods: BTreeMap<PodKey, TagSet>) {
        debug!("Replacing {} pod mappings on node {}", pods.len(), node);
        self.nodes.insert(node.to_string(), pods);
    }

    /// Insert or update the tags of one pod
    pub fn set_pod_tags(&self, node: &str, namespace: &str, pod: &str, tags: TagSet) {
        self.nodes
            .entry(node.to_string())
            .or_default()
            .insert(PodKey::new(namespace, pod), tags);
    }

    /// Remove one pod mapping, keeping the node itself
    pub fn remove_pod(&self, node: &str, namespace: &str, pod: &str) -> Option<TagSet> {
        self.nodes
            .get_mut(node)
            .and_then(|mut record| record.remove(&PodKey::new(namespace, pod)))
    }

    /// Forget a node and all of its pods
    pub fn remove_node(&self, node: &str) -> bool {
        self.nodes.remove(node).is_some()
    }

    /// Replace the whole content of the store
    ///
    /// Each node switches from its old record to its new one in a single
    /// insert, and stale nodes are dropped afterwards, so concurrent readers
    /// never observe a node that is present in both snapshots as missing.
    pub fn load_snapshot(&self, snapshot: Snapshot) {
        let records: Vec<(String, NodeRecord)> = snapshot
            .into_iter()
            .map(|(node, namespaces)| {
                let record = namespaces
                    .into_iter()
                    .flat_map(|(namespace, pods)| {
                        pods.into_iter().map(move |(pod, tags)| {
                            (PodKey::new(namespace.clone(), pod), tags)
                        })
                    })
                    .collect();
                (node, record)
            })
            .collect();

        let keep: HashSet<String> = records.iter().map(|(node, _)| node.clone()).collect();
        for (node, record) in records {
            self.nodes.insert(node, record);
        }
        self.nodes.retain(|node, _| keep.contains(node));

        info!("Snapshot loaded. Tracking {} nodes", self.nodes.len());
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn ensure_synced(&self) -> Result<()> {
        if self.is_synced() {
            Ok(())
        } else {
            Err(SvcmapError::CacheRead(
                "metadata cache has not completed its initial sync".to_string(),
            ))
        }
    }
}

impl Default for MetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataCache for MetadataStore {
    fn pod_tags(&self, node: &str, namespace: &str, pod: &str) -> Result<Option<TagSet>> {
        self.ensure_synced()?;

        Ok(self
            .nodes
            .get(node)
            .and_then(|record| record.get(&PodKey::new(namespace, pod)).cloned()))
    }

    fn node_bundle(&self, node: &str) -> Result<Option<NodeBundle>> {
        self.ensure_synced()?;

        // Pods sharing a name across namespaces collapse into one entry
        Ok(self.nodes.get(node).map(|record| {
            let mut bundle = NodeBundle::new();
            for (key, tags) in record.iter() {
                bundle.merge(&key.name, tags);
            }
            bundle
        }))
    }
}
