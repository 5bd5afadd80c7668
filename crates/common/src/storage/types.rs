//! Pool-level health and metrics types

use std::fmt::Debug;

use super::error::StorageResult;

/// Connection pool operations the application layer relies on
pub trait ConnectionPool: Send + Sync + Debug {
    /// Check pool health by acquiring a connection.
    fn health_check(&self) -> StorageResult<HealthStatus>;

    /// Snapshot of the pool counters
    fn metrics(&self) -> PoolMetrics;
}

/// Health status of the storage system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub active_connections: usize,
    pub idle_connections: usize,
    pub max_connections: usize,
    /// Set when unhealthy
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn healthy(active: usize, idle: usize, max: usize) -> Self {
        Self {
            healthy: true,
            active_connections: active,
            idle_connections: idle,
            max_connections: max,
            message: None,
        }
    }

    pub fn unhealthy(message: String) -> Self {
        Self {
            healthy: false,
            active_connections: 0,
            idle_connections: 0,
            max_connections: 0,
            message: Some(message),
        }
    }
}

/// Connection pool metrics
#[derive(Debug, Clone, Default)]
pub struct PoolMetrics {
    pub connections_acquired: u64,
    pub connections_timeout: u64,
    pub connections_error: u64,
    /// Average connection acquisition time (milliseconds)
    pub avg_acquisition_time_ms: u64,
}
