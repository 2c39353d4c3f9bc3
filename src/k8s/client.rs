use crate::metadata::{ClusterClient, ClusterConnector, NodePage};
use crate::{Result, SvcmapError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::api::ListParams;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Connects to the cluster with the ambient configuration (in-cluster
/// service account or kubeconfig).
///
/// The client is built on the first successful call and shared afterwards.
/// A failed attempt is not cached, so the next request retries.
#[derive(Default)]
pub struct KubeClusterConnector {
    client: OnceCell<Client>,
}

impl KubeClusterConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClusterConnector for KubeClusterConnector {
    async fn connect(&self) -> Result<Arc<dyn ClusterClient>> {
        let client = self
            .client
            .get_or_try_init(|| async {
                debug!("Initializing Kubernetes client");

                let client = Client::try_default()
                    .await
                    .map_err(|e| SvcmapError::ClientConnect(e.to_string()))?;

                info!("Successfully connected to Kubernetes cluster");
                Ok::<_, SvcmapError>(client)
            })
            .await?;

        Ok(Arc::new(KubeClusterClient::new(client.clone())))
    }
}

pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn nodes(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_nodes(&self, limit: u32, continue_token: Option<String>) -> Result<NodePage> {
        let mut params = ListParams::default().limit(limit);
        if let Some(token) = continue_token.as_deref() {
            params = params.continue_token(token);
        }

        let node_list = self.nodes().list(&params).await.map_err(list_error)?;

        Ok(NodePage {
            names: node_list
                .items
                .iter()
                .filter_map(|node| node.metadata.name.clone())
                .collect(),
            continue_token: node_list.metadata.continue_.filter(|t| !t.is_empty()),
        })
    }
}

fn list_error(e: kube::Error) -> SvcmapError {
    match &e {
        kube::Error::Api(response) if response.code == 403 => SvcmapError::ClusterQuery(
            "List nodes is not permitted at the cluster scope".to_string(),
        ),
        _ => SvcmapError::ClusterQuery(format!("Failed to list nodes: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("nodes is {}", reason.to_lowercase()),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_forbidden_maps_to_scope_error() {
        let err = list_error(api_error(403, "Forbidden"));
        assert_eq!(
            err.to_string(),
            "could not collect the service map for all nodes: List nodes is not permitted at the cluster scope"
        );
    }

    #[test]
    fn test_other_api_errors_keep_message() {
        let err = list_error(api_error(500, "InternalError"));
        assert!(matches!(err, SvcmapError::ClusterQuery(_)));
        assert!(err.to_string().contains("Failed to list nodes"));
    }
}
