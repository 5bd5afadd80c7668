//! Statistics engine - check counts, streaks and completion rate

use std::sync::Arc;

use chrono::NaiveDate;
use routinely_domain::{HabitStats, Result};
use tracing::debug;

use super::ports::CheckRepository;
use crate::clock::Clock;

/// Per-habit statistics over the check ledger
pub struct StatsEngine {
    checks: Arc<dyn CheckRepository>,
    clock: Arc<dyn Clock>,
}

impl StatsEngine {
    pub fn new(checks: Arc<dyn CheckRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { checks, clock }
    }

    /// Checks with `start <= scheduled_date <= end`; 0 for an inverted range.
    pub async fn count_habit_checks(
        &self,
        habit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64> {
        if start > end {
            return Ok(0);
        }
        self.checks.count_in_range(habit_id, start, end).await
    }

    /// Consecutive checked days ending today or yesterday.
    pub async fn get_habit_streak(&self, habit_id: &str) -> Result<u32> {
        let dates = self.checks.checked_dates_desc(habit_id).await?;
        Ok(current_streak(&dates, self.clock.today()))
    }

    pub async fn get_habit_stats(
        &self,
        habit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HabitStats> {
        let (total_checks, current_streak) = futures::try_join!(
            self.count_habit_checks(habit_id, start, end),
            self.get_habit_streak(habit_id),
        )?;
        let completion_rate = completion_rate(total_checks, start, end);
        debug!(habit_id, total_checks, current_streak, completion_rate, "Computed habit stats");
        Ok(HabitStats { total_checks, current_streak, completion_rate })
    }
}

/// Walk `dates_desc` (distinct, newest first) from `today`.
///
/// The first counted date must be today or yesterday; every following date
/// must be exactly one day before the previous counted one. Dates after
/// `today` are ignored.
pub fn current_streak(dates_desc: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut expected = today;

    for &date in dates_desc.iter().skip_while(|d| **d > today) {
        let gap = (expected - date).num_days();
        let contiguous = if streak == 0 { gap == 0 || gap == 1 } else { gap == 1 };
        if !contiguous {
            break;
        }
        streak += 1;
        expected = date;
    }
    streak
}

/// `total / days * 100`, one decimal place, capped at 100. Zero for an empty
/// or inverted range.
pub fn completion_rate(total_checks: u64, start: NaiveDate, end: NaiveDate) -> f64 {
    let days = (end - start).num_days() + 1;
    if days <= 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = total_checks as f64 / days as f64 * 100.0;
    ((rate * 10.0).round() / 10.0).min(100.0)
}
