//! Read-only views served by the metadata API
//!
//! All maps are ordered so that repeated lookups against the same cache
//! snapshot encode to byte-identical JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tags attached to one pod, in discovery order
pub type TagSet = Vec<String>;

/// Pod name -> tags for every pod known on one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeBundle {
    pods: BTreeMap<String, TagSet>,
}

impl NodeBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tags of a pod, replacing any previous value
    pub fn insert(&mut self, pod_name: impl Into<String>, tags: TagSet) {
        self.pods.insert(pod_name.into(), tags);
    }

    /// Append tags to a pod, skipping ones it already carries
    pub fn merge(&mut self, pod_name: &str, tags: &[String]) {
        let entry = self.pods.entry(pod_name.to_string()).or_default();
        for tag in tags {
            if !entry.contains(tag) {
                entry.push(tag.clone());
            }
        }
    }

    pub fn get(&self, pod_name: &str) -> Option<&TagSet> {
        self.pods.get(pod_name)
    }

    pub fn pods(&self) -> impl Iterator<Item = (&String, &TagSet)> {
        self.pods.iter()
    }

    pub fn len(&self) -> usize {
        self.pods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pods.is_empty()
    }
}

impl FromIterator<(String, TagSet)> for NodeBundle {
    fn from_iter<I: IntoIterator<Item = (String, TagSet)>>(iter: I) -> Self {
        Self {
            pods: iter.into_iter().collect(),
        }
    }
}

/// One node's slot in a [`ClusterBundle`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeEntry {
    /// The node is known to the cluster but its bundle could not be read
    Missing {
        #[serde(rename = "Error")]
        error: String,
    },
    Bundle(NodeBundle),
}

impl NodeEntry {
    /// Marker for a node that has no entry in the metadata cache
    pub fn not_in_cache(node_name: &str) -> Self {
        NodeEntry::Missing {
            error: format!(
                "the key KubernetesMetadataMapping/{} not found in the cache",
                node_name
            ),
        }
    }

    pub fn bundle(&self) -> Option<&NodeBundle> {
        match self {
            NodeEntry::Bundle(bundle) => Some(bundle),
            NodeEntry::Missing { .. } => None,
        }
    }
}

/// Node name -> bundle or per-node error, plus an optional error that
/// stopped the aggregation before every node was visited.
///
/// Encodes as a flat object: `{"node1": {...}, "node2": {"Error": "..."}}`,
/// with a top-level `"Error"` key only when the aggregation failed.
/// Kubernetes object names are lowercase, so no node can collide with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterBundle {
    #[serde(flatten)]
    nodes: BTreeMap<String, NodeEntry>,
    #[serde(rename = "Error", skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ClusterBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node_name: impl Into<String>, entry: NodeEntry) {
        self.nodes.insert(node_name.into(), entry);
    }

    pub fn get(&self, node_name: &str) -> Option<&NodeEntry> {
        self.nodes.get(node_name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&String, &NodeEntry)> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Tag the bundle with the error that interrupted its aggregation
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Nothing to render: no nodes and no error
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.error.is_none()
    }
}
