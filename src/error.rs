use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvcmapError {
    #[error("{0}")]
    CacheRead(String),

    #[error("Can't create client to query the API Server: {0}")]
    ClientConnect(String),

    #[error("could not collect the service map for all nodes: {0}")]
    ClusterQuery(String),

    #[error("Could not encode the response: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<prometheus::Error> for SvcmapError {
    fn from(e: prometheus::Error) -> Self {
        SvcmapError::MetricsError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SvcmapError>;
