//! # Routinely Domain
//!
//! Business domain types and models for Routinely.
//!
//! This crate contains:
//! - Habit scheduling model (frequency, timings, reminders, period)
//! - Check ledger and derived view types
//! - Catalog entities (products, ingredients, tags) and their edit history
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other Routinely crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::slug::slugify;
