//! Habit scheduling and completion tracking

mod ledger;
pub mod ports;
pub mod service;
pub mod stats;
pub mod today;

pub use service::HabitService;
pub use stats::StatsEngine;
pub use today::TodayViewBuilder;
