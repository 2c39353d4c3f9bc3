pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod k8s;
pub mod metadata;
pub mod metrics;

pub use error::{Result, SvcmapError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
