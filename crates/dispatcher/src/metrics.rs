//! Backend metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single network backend
#[derive(Debug, Default)]
pub struct BackendMetrics {
    /// Events handed to the connection successfully
    sent_count: AtomicU64,
    /// Send failures
    failure_count: AtomicU64,
    /// Sessions established
    connect_count: AtomicU64,
    /// Failed connection attempts
    connect_failure_count: AtomicU64,
    /// Sessions dropped after a send failure
    disconnect_count: AtomicU64,
}

impl BackendMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> u64 {
        self.sent_count.load(Ordering::Relaxed)
    }

    pub fn inc_sent_count(&self) {
        self.sent_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connect_count(&self) -> u64 {
        self.connect_count.load(Ordering::Relaxed)
    }

    pub fn inc_connect_count(&self) {
        self.connect_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connect_failure_count(&self) -> u64 {
        self.connect_failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_connect_failure_count(&self) {
        self.connect_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn disconnect_count(&self) -> u64 {
        self.disconnect_count.load(Ordering::Relaxed)
    }

    pub fn inc_disconnect_count(&self) {
        self.disconnect_count.fetch_add(1, Ordering::Relaxed);
    }
}
