//! Storage primitives for SQLite databases
//!
//! Generic pooling, per-connection pragmas and the storage error type.
//! Schemas and queries belong to the application's infra layer.

pub mod config;
pub mod error;
pub mod metrics;
pub mod sqlite;
pub mod types;

// Re-export commonly used types
pub use config::{StorageConfig, StorageConfigBuilder};
pub use error::{StorageError, StorageResult};
pub use metrics::StorageMetrics;
pub use sqlite::{apply_connection_pragmas, SqliteConnection, SqlitePool, SqliteStatement};
pub use types::{ConnectionPool, HealthStatus, PoolMetrics};
