//! Today view - habits applicable today joined with today's checks

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use routinely_domain::{Check, Frequency, HabitWithRelations, Result, TodayHabit};
use tracing::debug;

use super::service::HabitService;
use crate::clock::Clock;

/// Builds the read-only "today" projection for a user
pub struct TodayViewBuilder {
    habits: Arc<HabitService>,
    clock: Arc<dyn Clock>,
}

impl TodayViewBuilder {
    pub fn new(habits: Arc<HabitService>, clock: Arc<dyn Clock>) -> Self {
        Self { habits, clock }
    }

    /// Active habits whose period permits today, each with today's checks.
    ///
    /// Only the period filters; frequency is reported through
    /// `is_scheduled_today` but never excludes a habit.
    pub async fn get_today_habits(&self, user_id: &str) -> Result<Vec<TodayHabit>> {
        let today = self.clock.today();
        let (habits, checks) = futures::try_join!(
            self.habits.get_user_habits_with_relations(user_id),
            self.habits.get_user_checks_for_date(user_id, today),
        )?;

        let mut checks_by_habit: HashMap<String, Vec<Check>> = HashMap::new();
        for check in checks {
            checks_by_habit.entry(check.habit_id.clone()).or_default().push(check);
        }

        let view: Vec<TodayHabit> = habits
            .into_iter()
            .filter(|h| h.period.as_ref().map_or(true, |period| period.permits(today)))
            .map(|h| {
                let checks = checks_by_habit.remove(&h.habit.id).unwrap_or_default();
                let anchor = self.clock.date_of(h.habit.created_at);
                project(h, checks, today, anchor)
            })
            .collect();

        debug!(user_id, %today, count = view.len(), "Built today view");
        Ok(view)
    }
}

/// `anchor` is the creation date in the clock's timezone.
fn project(
    h: HabitWithRelations,
    checks: Vec<Check>,
    today: NaiveDate,
    anchor: NaiveDate,
) -> TodayHabit {
    let required_count = h.timings.len().max(1);
    let is_completed = checks.len() >= required_count;
    let is_scheduled_today =
        h.frequency.as_ref().unwrap_or(&Frequency::Daily).is_due_on(today, anchor);

    TodayHabit {
        habit: h.habit,
        frequency: h.frequency,
        timings: h.timings,
        checks,
        required_count,
        is_completed,
        is_scheduled_today,
    }
}
