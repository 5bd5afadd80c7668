//! Field-level audit of catalog updates
//!
//! One diff routine serves every audited entity; each entity supplies a
//! [`DiffPolicy`] naming the keys never diffed and the keys a change set may
//! contain.

pub mod diff;
pub mod recorder;

pub use diff::{compute_changes, DiffPolicy};
pub use recorder::{Audited, AuditRecorder, EditLog, Editor};
