//! Derived read models: the today view and habit statistics.

use serde::{Deserialize, Serialize};

use super::check::Check;
use super::habit::{Frequency, Habit, Timing};

/// One habit as seen on the "today" screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayHabit {
    pub habit: Habit,
    pub frequency: Option<Frequency>,
    pub timings: Vec<Timing>,
    pub checks: Vec<Check>,
    /// Number of checks needed to count as done: one per timing, at least one.
    pub required_count: usize,
    pub is_completed: bool,
    /// Whether the frequency rule falls on today. Informational only; the
    /// view does not filter on it. A habit without frequency counts as daily.
    pub is_scheduled_today: bool,
}

/// Aggregate statistics over a date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub total_checks: u64,
    pub current_streak: u32,
    /// Percentage on a 0–100 scale, one decimal place.
    pub completion_rate: f64,
}
