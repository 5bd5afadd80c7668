//! # Routinely API
//!
//! Application layer - composition root and transport helpers.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Error code to status mapping and the error envelope
//! - Tracing initialisation and health reporting
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;
pub mod errors;
pub mod utils;

// Re-export for convenience
pub use context::AppContext;
pub use errors::{status_for, ErrorEnvelope};
