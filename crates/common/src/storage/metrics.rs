//! Storage metrics tracking
//!
//! Atomic counters for connection acquisition; no external metrics backend.

use std::sync::atomic::{AtomicU64, Ordering};

/// Simple storage metrics tracker
#[derive(Debug)]
pub struct StorageMetrics {
    pub connections_acquired: AtomicU64,
    pub connections_timeout: AtomicU64,
    pub connections_error: AtomicU64,
    total_connection_time_ms: AtomicU64,
    max_pool_size: u32,
}

impl StorageMetrics {
    pub fn new(max_pool_size: u32) -> Self {
        Self {
            connections_acquired: AtomicU64::new(0),
            connections_timeout: AtomicU64::new(0),
            connections_error: AtomicU64::new(0),
            total_connection_time_ms: AtomicU64::new(0),
            max_pool_size,
        }
    }

    pub fn record_connection_acquired(&self, duration_ms: u64) {
        self.connections_acquired.fetch_add(1, Ordering::Relaxed);
        self.total_connection_time_ms.fetch_add(duration_ms, Ordering::Relaxed);
    }

    pub fn record_connection_timeout(&self) {
        self.connections_timeout.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connection_error(&self) {
        self.connections_error.fetch_add(1, Ordering::Relaxed);
    }

    /// Average connection acquisition time in milliseconds
    pub fn avg_connection_time_ms(&self) -> u64 {
        let total = self.total_connection_time_ms.load(Ordering::Relaxed);
        let count = self.connections_acquired.load(Ordering::Relaxed);
        total.checked_div(count).unwrap_or(0)
    }

    pub fn max_pool_size(&self) -> u32 {
        self.max_pool_size
    }
}
