pub mod collector;
pub mod exporter;

pub use collector::{ApiStats, Operation};
pub use exporter::PrometheusExporter;
