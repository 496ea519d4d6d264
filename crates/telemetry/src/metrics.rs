//! In-process ingest counters.
//!
//! Lock-free counters inspected from logs and tests. There is no
//! external metrics backend; these exist so operators can see at a
//! glance whether rejections or store errors are piling up.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
#[derive(Debug)]
pub struct Counter(AtomicU64);

impl Counter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters for the ingest pipeline.
#[derive(Debug)]
pub struct Metrics {
    /// Submissions hitting POST /track, before any checks.
    pub submissions_received: Counter,
    /// Submissions validated and stored.
    pub events_accepted: Counter,
    /// Submissions rejected at the validation boundary.
    pub events_rejected: Counter,
    /// Insert or list failures against the store.
    pub store_errors: Counter,
    /// Requests refused by the rate limiter.
    pub rate_limited: Counter,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            submissions_received: Counter::new(),
            events_accepted: Counter::new(),
            events_rejected: Counter::new(),
            store_errors: Counter::new(),
            rate_limited: Counter::new(),
        }
    }

    /// Point-in-time view, mainly for logging.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submissions_received: self.submissions_received.get(),
            events_accepted: self.events_accepted.get(),
            events_rejected: self.events_rejected.get(),
            store_errors: self.store_errors.get(),
            rate_limited: self.rate_limited.get(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub submissions_received: u64,
    pub events_accepted: u64,
    pub events_rejected: u64,
    pub store_errors: u64,
    pub rate_limited: u64,
}

static METRICS: Metrics = Metrics::new();

/// Get the global metrics registry.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
