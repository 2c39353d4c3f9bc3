//! Response body encoding
//!
//! An empty body means nothing could be rendered; the handlers answer 404
//! in that case.

use crate::metadata::{ClusterBundle, NodeBundle, TagSet};
use crate::Result;
use bytes::Bytes;

pub fn encode_tags(tags: &TagSet) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(tags)?))
}

/// An absent bundle renders to an empty body, an empty bundle to `{}`
pub fn encode_node_bundle(bundle: Option<&NodeBundle>) -> Result<Bytes> {
    match bundle {
        Some(bundle) => Ok(Bytes::from(serde_json::to_vec(bundle)?)),
        None => Ok(Bytes::new()),
    }
}

pub fn encode_cluster_bundle(bundle: &ClusterBundle) -> Result<Bytes> {
    if bundle.is_empty() {
        return Ok(Bytes::new());
    }
    Ok(Bytes::from(serde_json::to_vec(bundle)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::NodeEntry;

    #[test]
    fn test_tags_keep_order() {
        let tags = vec!["kube_service:b".to_string(), "kube_service:a".to_string()];
        assert_eq!(
            encode_tags(&tags).unwrap(),
            Bytes::from_static(br#"["kube_service:b","kube_service:a"]"#)
        );
    }

    #[test]
    fn test_node_bundle_emptiness() {
        assert!(encode_node_bundle(None).unwrap().is_empty());
        assert_eq!(
            encode_node_bundle(Some(&NodeBundle::new())).unwrap(),
            Bytes::from_static(b"{}")
        );
    }

    #[test]
    fn test_cluster_bundle_emptiness() {
        let mut bundle = ClusterBundle::new();
        assert!(encode_cluster_bundle(&bundle).unwrap().is_empty());

        bundle.insert("node-a", NodeEntry::Bundle(NodeBundle::new()));
        assert_eq!(
            encode_cluster_bundle(&bundle).unwrap(),
            Bytes::from_static(br#"{"node-a":{}}"#)
        );
    }
}
