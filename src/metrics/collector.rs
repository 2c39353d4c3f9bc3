use crate::Result;
use prometheus::{IntCounterVec, Opts, Registry};

/// Metadata API operation a counter is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Pod,
    Node,
    Cluster,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Pod, Operation::Node, Operation::Cluster];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Pod => "pod",
            Operation::Node => "node",
            Operation::Cluster => "cluster",
        }
    }
}

/// Request and error counters of the metadata API.
///
/// Each instance owns its registry, so separate services (and tests) never
/// share counts.
#[derive(Clone)]
pub struct ApiStats {
    registry: Registry,
    requests: IntCounterVec,
    errors: IntCounterVec,
}

impl ApiStats {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(
                "svcmap_metadata_requests_total",
                "Total metadata API requests",
            ),
            &["operation"],
        )?;
        let errors = IntCounterVec::new(
            Opts::new(
                "svcmap_metadata_errors_total",
                "Total metadata API requests that failed",
            ),
            &["operation"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(errors.clone()))?;

        // Expose every series at zero from the start
        for op in Operation::ALL {
            requests.with_label_values(&[op.as_str()]);
            errors.with_label_values(&[op.as_str()]);
        }

        Ok(Self {
            registry,
            requests,
            errors,
        })
    }

    pub fn increment_requests(&self, op: Operation) {
        self.requests.with_label_values(&[op.as_str()]).inc();
    }

    pub fn increment_errors(&self, op: Operation) {
        self.errors.with_label_values(&[op.as_str()]).inc();
    }

    pub fn requests(&self, op: Operation) -> u64 {
        self.requests.with_label_values(&[op.as_str()]).get()
    }

    pub fn errors(&self, op: Operation) -> u64 {
        self.errors.with_label_values(&[op.as_str()]).get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_per_operation() {
        let stats = ApiStats::new().unwrap();

        stats.increment_requests(Operation::Pod);
        stats.increment_requests(Operation::Pod);
        stats.increment_errors(Operation::Cluster);

        assert_eq!(stats.requests(Operation::Pod), 2);
        assert_eq!(stats.requests(Operation::Node), 0);
        assert_eq!(stats.errors(Operation::Cluster), 1);
        assert_eq!(stats.errors(Operation::Pod), 0);
    }

    #[test]
    fn test_instances_do_not_share_counts() {
        let first = ApiStats::new().unwrap();
        let second = ApiStats::new().unwrap();

        first.increment_requests(Operation::Node);

        assert_eq!(first.requests(Operation::Node), 1);
        assert_eq!(second.requests(Operation::Node), 0);
    }
}
