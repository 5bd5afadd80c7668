//! # Routinely Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories for habits, checks and the catalog
//! - The pooled `DbManager` and embedded schema
//! - Configuration loading from the environment or files
//!
//! ## Architecture
//! - Implements traits defined in `routinely-core`
//! - Depends on `routinely-common` for the connection pool
//! - Contains all "impure" code (I/O)

pub mod config;
pub mod database;
pub mod errors;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
