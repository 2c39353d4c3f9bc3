pub mod client;

pub use client::{KubeClusterClient, KubeClusterConnector};
