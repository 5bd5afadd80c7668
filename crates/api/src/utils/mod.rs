//! Process-level helpers

pub mod health;
pub mod logging;
