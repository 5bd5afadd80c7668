//! Common plumbing shared across Routinely crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error types only
//! - `observability`: tracing spans on storage calls
//! - `platform`: pooled SQLite storage (r2d2 + rusqlite)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod storage;

#[cfg(feature = "platform")]
pub use storage::{
    ConnectionPool, HealthStatus, PoolMetrics, SqliteConnection, SqlitePool, StorageConfig,
    StorageError, StorageResult,
};
