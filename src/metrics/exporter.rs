use crate::metrics::collector::ApiStats;
use crate::Result;
use prometheus::{Encoder, TextEncoder};

/// Renders [`ApiStats`] in the Prometheus text exposition format
#[derive(Clone)]
pub struct PrometheusExporter {
    stats: ApiStats,
}

impl PrometheusExporter {
    pub fn new(stats: ApiStats) -> Self {
        Self { stats }
    }

    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    pub fn format_metrics(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let families = self.stats.registry().gather();

        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Operation;

    #[test]
    fn test_format_metrics() {
        let stats = ApiStats::new().unwrap();
        stats.increment_requests(Operation::Pod);
        stats.increment_errors(Operation::Pod);

        let exporter = PrometheusExporter::new(stats);
        let text = exporter.format_metrics().unwrap();

        assert!(text.contains("# TYPE svcmap_metadata_requests_total counter"));
        assert!(text.contains(r#"svcmap_metadata_requests_total{operation="pod"} 1"#));
        assert!(text.contains(r#"svcmap_metadata_errors_total{operation="pod"} 1"#));
        assert!(text.contains(r#"svcmap_metadata_requests_total{operation="cluster"} 0"#));
    }
}
