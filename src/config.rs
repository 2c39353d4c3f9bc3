use crate::metadata::service::DEFAULT_NODE_PAGE_SIZE;
use crate::{Result, SvcmapError};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "svcmap-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serves Kubernetes service tags of pods to node agents", long_about = None)]
pub struct Cli {
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        long,
        env = "SVCMAP_BIND_ADDRESS",
        default_value = "0.0.0.0:5005",
        help = "Address the metadata API listens on"
    )]
    pub bind: String,

    #[arg(
        long,
        env = "SVCMAP_NODE_PAGE_SIZE",
        default_value_t = DEFAULT_NODE_PAGE_SIZE,
        help = "Nodes requested per page when listing the cluster"
    )]
    pub node_page_size: u32,

    #[arg(
        long,
        env = "SVCMAP_SNAPSHOT",
        help = "JSON file (node -> namespace -> pod -> tags) to seed the metadata cache"
    )]
    pub snapshot: Option<PathBuf>,
}

/// Validated server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub node_page_size: u32,
    pub snapshot: Option<PathBuf>,
}

impl Cli {
    pub fn server_config(&self) -> Result<ServerConfig> {
        let bind_address = self.bind.parse().map_err(|e| {
            SvcmapError::ConfigError(format!("invalid bind address {:?}: {}", self.bind, e))
        })?;

        if self.node_page_size == 0 {
            return Err(SvcmapError::ConfigError(
                "node page size must be greater than zero".to_string(),
            ));
        }

        Ok(ServerConfig {
            bind_address,
            node_page_size: self.node_page_size,
            snapshot: self.snapshot.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["svcmap-server"]).unwrap();
        let config = cli.server_config().unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:5005".parse().unwrap());
        assert_eq!(config.node_page_size, DEFAULT_NODE_PAGE_SIZE);
        assert!(config.snapshot.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_rejects_bad_bind_address() {
        let cli = Cli::try_parse_from(["svcmap-server", "--bind", "not-an-address"]).unwrap();
        let err = cli.server_config().unwrap_err();
        assert!(matches!(err, SvcmapError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let cli = Cli::try_parse_from(["svcmap-server", "--node-page-size", "0"]).unwrap();
        assert!(cli.server_config().is_err());
    }
}
