pub mod cluster;
pub mod service;
pub mod types;

pub use cluster::{compute_cluster_bundle, ClusterClient, ClusterConnector, NodePage};
pub use service::{ClusterLookup, MetadataLookupService, NodeLookup, PodLookup};
pub use types::{ClusterBundle, NodeBundle, NodeEntry, TagSet};
