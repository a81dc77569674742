//! Per-sink delivery counters
//!
//! Shared between the dispatcher (enqueue side) and the sink worker (delivery side).

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct SinkMetrics {
    queued: AtomicUsize,
    peak_queued: AtomicUsize,
    delivered: AtomicU64,
    rejected: AtomicU64,
    dropped: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record entered the queue, which now holds `depth` records
    pub fn on_enqueued(&self, depth: usize) {
        self.queued.store(depth, Ordering::Relaxed);
        self.peak_queued.fetch_max(depth, Ordering::Relaxed);
    }

    /// The worker took a record off the queue, `depth` records remain
    pub fn on_dequeued(&self, depth: usize) {
        self.queued.store(depth, Ordering::Relaxed);
    }

    /// The sink accepted a record
    pub fn on_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// The sink returned an error for a record
    pub fn on_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// The queue was full and the record never reached the sink
    pub fn on_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queued: self.queued.load(Ordering::Relaxed),
            peak_queued: self.peak_queued.load(Ordering::Relaxed),
            delivered: self.delivered(),
            rejected: self.rejected(),
            dropped: self.dropped(),
        }
    }
}

/// Point-in-time copy of [`SinkMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queued: usize,
    /// Deepest the queue has been
    pub peak_queued: usize,
    pub delivered: u64,
    pub rejected: u64,
    pub dropped: u64,
}

impl MetricsSnapshot {
    /// Records that were handed to the dispatcher but never delivered
    pub fn lost(&self) -> u64 {
        self.rejected + self.dropped
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "delivered={}, rejected={}, dropped={}, queued={} (peak {})",
            self.delivered, self.rejected, self.dropped, self.queued, self.peak_queued
        )
    }
}
