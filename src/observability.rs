//! In-process counters for served requests and resolved targets

use std::sync::atomic::{AtomicU64, Ordering};

use crate::aggregator::AggregateResponse;

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    batches_served: AtomicU64,
    lookups_served: AtomicU64,
    targets_resolved: AtomicU64,
    targets_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_served(&self, response: &AggregateResponse) {
        self.batches_served.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "batches_served", "Metric incremented");
        self.record_targets(response);
    }

    pub fn lookup_served(&self, response: &AggregateResponse) {
        self.lookups_served.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "lookups_served", "Metric incremented");
        self.record_targets(response);
    }

    fn record_targets(&self, response: &AggregateResponse) {
        let failed = response.failed_count() as u64;
        let resolved = response.results.len() as u64 - failed;

        self.targets_resolved.fetch_add(resolved, Ordering::Relaxed);
        self.targets_failed.fetch_add(failed, Ordering::Relaxed);
        tracing::debug!(resolved, failed, "Target counters updated");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_served: self.batches_served.load(Ordering::Relaxed),
            lookups_served: self.lookups_served.load(Ordering::Relaxed),
            targets_resolved: self.targets_resolved.load(Ordering::Relaxed),
            targets_failed: self.targets_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batches_served: u64,
    pub lookups_served: u64,
    pub targets_resolved: u64,
    pub targets_failed: u64,
}
