//! Metadata cache consumed by the lookup service
//!
//! The service only reads through [`MetadataCache`]. Keeping the cache in
//! sync with the cluster is the job of whoever owns the concrete store.

pub mod store;

pub use store::{MetadataStore, PodKey, Snapshot};

use crate::metadata::{NodeBundle, TagSet};
use crate::Result;

pub trait MetadataCache: Send + Sync {
    /// Tags of a single pod. `Ok(None)` when the cache has no entry for it.
    fn pod_tags(&self, node: &str, namespace: &str, pod: &str) -> Result<Option<TagSet>>;

    /// All pods of a node. `Ok(None)` when the node is not cached at all,
    /// which is distinct from a cached node with no pods.
    fn node_bundle(&self, node: &str) -> Result<Option<NodeBundle>>;
}
