//! Port interfaces for habits and checks
//!
//! Adapters return `Ok(None)` / `Ok(false)` when a row is absent; deciding
//! which error code that becomes is left to the services.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use routinely_domain::{
    Check, CheckInput, CreateHabitInput, Frequency, Habit, Period, Reminder, ReminderInput,
    Result, Timing, TimingInput, UpdateHabitInput,
};

/// Persistence of habits and their four schedule sub-records
#[async_trait]
pub trait HabitRepository: Send + Sync {
    /// Insert the habit and every supplied sub-record in one transaction.
    async fn create_habit(&self, input: &CreateHabitInput) -> Result<Habit>;

    async fn find_habit(&self, id: &str) -> Result<Option<Habit>>;

    /// Non-archived habits of a user, oldest first.
    async fn list_active_habits(&self, user_id: &str) -> Result<Vec<Habit>>;

    /// Apply the scalar patch and bump `updated_at`.
    async fn update_habit(&self, id: &str, patch: &UpdateHabitInput) -> Result<Option<Habit>>;

    /// Set (`Some`) or clear (`None`) `archived_at`.
    async fn set_archived_at(
        &self,
        id: &str,
        archived_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Habit>>;

    async fn delete_habit(&self, id: &str) -> Result<bool>;

    async fn get_frequency(&self, habit_id: &str) -> Result<Option<Frequency>>;

    /// Insert or replace the single frequency row of a habit.
    async fn upsert_frequency(&self, habit_id: &str, frequency: &Frequency) -> Result<Frequency>;

    async fn delete_frequency(&self, habit_id: &str) -> Result<bool>;

    /// Timings ordered by time of day.
    async fn get_timings(&self, habit_id: &str) -> Result<Vec<Timing>>;

    /// Delete every timing of the habit and insert `timings`, atomically.
    async fn replace_timings(&self, habit_id: &str, timings: &[TimingInput])
        -> Result<Vec<Timing>>;

    async fn get_reminders(&self, habit_id: &str) -> Result<Vec<Reminder>>;

    /// Delete every reminder of the habit and insert `reminders`, atomically.
    async fn replace_reminders(
        &self,
        habit_id: &str,
        reminders: &[ReminderInput],
    ) -> Result<Vec<Reminder>>;

    async fn get_period(&self, habit_id: &str) -> Result<Option<Period>>;

    /// Insert or replace the single period row of a habit.
    async fn upsert_period(&self, habit_id: &str, period: &Period) -> Result<Period>;

    async fn delete_period(&self, habit_id: &str) -> Result<bool>;
}

/// Persistence of the check ledger
#[async_trait]
pub trait CheckRepository: Send + Sync {
    /// Insert a check. `Ok(None)` when the (habit, date, timing) slot is
    /// already taken.
    async fn insert_check(&self, input: &CheckInput) -> Result<Option<Check>>;

    async fn delete_check(&self, id: &str) -> Result<bool>;

    /// Delete every check of the habit on `date`; returns the number removed.
    async fn delete_checks_on(&self, habit_id: &str, date: NaiveDate) -> Result<u64>;

    /// Check occupying the given slot (`""` is the timing-agnostic slot).
    async fn find_check(
        &self,
        habit_id: &str,
        date: NaiveDate,
        timing_slot: &str,
    ) -> Result<Option<Check>>;

    async fn checks_for_user_on(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Check>>;

    /// Checks with `start <= scheduled_date <= end`, ascending by date.
    async fn checks_in_range(
        &self,
        habit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Check>>;

    async fn count_in_range(&self, habit_id: &str, start: NaiveDate, end: NaiveDate)
        -> Result<u64>;

    /// Distinct dates carrying at least one check, newest first.
    async fn checked_dates_desc(&self, habit_id: &str) -> Result<Vec<NaiveDate>>;

    async fn exists_on(&self, habit_id: &str, date: NaiveDate) -> Result<bool>;
}
