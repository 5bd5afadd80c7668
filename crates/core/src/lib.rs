//! # Routinely Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (async traits) for every store
//! - Habit store, check ledger, today view and statistics
//! - The generic field-level audit recorder
//! - Catalog services (products, ingredients, links, tags)
//!
//! ## Architecture Principles
//! - Only depends on `routinely-domain`
//! - No database, HTTP, or platform code
//! - Storage handles are injected through constructors, never global

pub mod audit;
pub mod catalog;
pub mod clock;
pub mod habits;

pub use audit::{Audited, AuditRecorder, DiffPolicy, EditLog, Editor};
pub use catalog::ports::{
    IngredientRepository, ProductIngredientRepository, ProductRepository, TagRepository,
};
pub use catalog::{IngredientService, ProductIngredientService, ProductService, TagService};
pub use clock::{Clock, FixedClock, SystemClock};
pub use habits::ports::{CheckRepository, HabitRepository};
pub use habits::{HabitService, StatsEngine, TodayViewBuilder};
