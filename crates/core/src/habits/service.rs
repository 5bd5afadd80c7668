//! Habit store - habits and their schedule sub-records

use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use routinely_domain::{
    validate_reminders, validate_timings, CreateHabitInput, Entity, Frequency, Habit,
    HabitWithRelations, Period, Reminder, ReminderInput, Result, RoutinelyError, Timing,
    TimingInput, UpdateHabitInput,
};
use tracing::{debug, info, instrument};

use super::ports::{CheckRepository, HabitRepository};

/// Habit store and check ledger
///
/// Store operations live here; the ledger half is implemented in the sibling
/// `ledger` module on the same type.
pub struct HabitService {
    pub(super) habits: Arc<dyn HabitRepository>,
    pub(super) checks: Arc<dyn CheckRepository>,
}

impl HabitService {
    pub fn new(habits: Arc<dyn HabitRepository>, checks: Arc<dyn CheckRepository>) -> Self {
        Self { habits, checks }
    }

    /// Create a habit with its frequency, timings, reminders and period.
    ///
    /// Everything is validated first; the repository writes it in a single
    /// transaction, so a failure leaves no habit behind.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create_habit(&self, input: CreateHabitInput) -> Result<Habit> {
        input.validate()?;
        let habit = self.habits.create_habit(&input).await?;
        info!(habit_id = %habit.id, timings = input.timings.len(), "Habit created");
        Ok(habit)
    }

    /// Habit plus all sub-records, fetched concurrently.
    pub async fn get_habit_by_id(&self, id: &str) -> Result<HabitWithRelations> {
        let (habit, frequency, timings, reminders, period) = futures::try_join!(
            self.habits.find_habit(id),
            self.habits.get_frequency(id),
            self.habits.get_timings(id),
            self.habits.get_reminders(id),
            self.habits.get_period(id),
        )?;
        let habit = habit.ok_or(RoutinelyError::NotFound(Entity::Habit))?;
        Ok(HabitWithRelations { habit, frequency, timings, reminders, period })
    }

    /// Active habits of a user, oldest first.
    pub async fn get_user_habits(&self, user_id: &str) -> Result<Vec<Habit>> {
        let habits = self.habits.list_active_habits(user_id).await?;
        debug!(user_id, count = habits.len(), "Loaded active habits");
        Ok(habits)
    }

    pub async fn get_user_habits_with_relations(
        &self,
        user_id: &str,
    ) -> Result<Vec<HabitWithRelations>> {
        let habits = self.get_user_habits(user_id).await?;
        try_join_all(habits.iter().map(|habit| self.get_habit_by_id(&habit.id))).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update_habit(&self, id: &str, patch: UpdateHabitInput) -> Result<Habit> {
        patch.validate()?;
        let habit = self
            .habits
            .update_habit(id, &patch)
            .await?
            .ok_or(RoutinelyError::NotFound(Entity::Habit))?;
        info!(habit_id = id, "Habit updated");
        Ok(habit)
    }

    /// Soft-delete: set `archived_at`.
    pub async fn archive_habit(&self, id: &str) -> Result<Habit> {
        let habit = self
            .habits
            .set_archived_at(id, Some(Utc::now()))
            .await?
            .ok_or(RoutinelyError::NotFound(Entity::Habit))?;
        info!(habit_id = id, "Habit archived");
        Ok(habit)
    }

    pub async fn restore_habit(&self, id: &str) -> Result<Habit> {
        let habit = self
            .habits
            .set_archived_at(id, None)
            .await?
            .ok_or(RoutinelyError::NotFound(Entity::Habit))?;
        info!(habit_id = id, "Habit restored");
        Ok(habit)
    }

    /// Hard delete; sub-records and checks cascade.
    pub async fn delete_habit(&self, id: &str) -> Result<()> {
        if !self.habits.delete_habit(id).await? {
            return Err(RoutinelyError::NotFound(Entity::Habit));
        }
        info!(habit_id = id, "Habit deleted");
        Ok(())
    }

    /// Fail with `unauthorized_access` unless `user_id` owns the habit.
    pub async fn ensure_owner(&self, habit_id: &str, user_id: &str) -> Result<Habit> {
        let habit = self
            .habits
            .find_habit(habit_id)
            .await?
            .ok_or(RoutinelyError::NotFound(Entity::Habit))?;
        if habit.user_id != user_id {
            return Err(RoutinelyError::UnauthorizedAccess);
        }
        Ok(habit)
    }

    // Sub-records --------------------------------------------------------

    pub async fn get_habit_frequency(&self, habit_id: &str) -> Result<Option<Frequency>> {
        self.habits.get_frequency(habit_id).await
    }

    /// Upsert keyed by habit: a habit has at most one frequency.
    pub async fn update_habit_frequency(
        &self,
        habit_id: &str,
        frequency: Frequency,
    ) -> Result<Frequency> {
        frequency.validate()?;
        self.require_habit(habit_id).await?;
        let stored = self.habits.upsert_frequency(habit_id, &frequency).await?;
        info!(habit_id, kind = %stored.kind(), "Habit frequency set");
        Ok(stored)
    }

    pub async fn delete_habit_frequency(&self, habit_id: &str) -> Result<bool> {
        self.habits.delete_frequency(habit_id).await
    }

    pub async fn get_habit_timings(&self, habit_id: &str) -> Result<Vec<Timing>> {
        self.habits.get_timings(habit_id).await
    }

    /// Replace-all: an empty slice leaves the habit with no timings.
    pub async fn set_habit_timings(
        &self,
        habit_id: &str,
        timings: Vec<TimingInput>,
    ) -> Result<Vec<Timing>> {
        validate_timings(&timings)?;
        self.require_habit(habit_id).await?;
        let stored = self.habits.replace_timings(habit_id, &timings).await?;
        info!(habit_id, count = stored.len(), "Habit timings replaced");
        Ok(stored)
    }

    pub async fn get_habit_reminders(&self, habit_id: &str) -> Result<Vec<Reminder>> {
        self.habits.get_reminders(habit_id).await
    }

    /// Replace-all: an empty slice leaves the habit with no reminders.
    pub async fn set_habit_reminders(
        &self,
        habit_id: &str,
        reminders: Vec<ReminderInput>,
    ) -> Result<Vec<Reminder>> {
        validate_reminders(&reminders)?;
        self.require_habit(habit_id).await?;
        let stored = self.habits.replace_reminders(habit_id, &reminders).await?;
        info!(habit_id, count = stored.len(), "Habit reminders replaced");
        Ok(stored)
    }

    pub async fn get_habit_period(&self, habit_id: &str) -> Result<Option<Period>> {
        self.habits.get_period(habit_id).await
    }

    /// Upsert keyed by habit. Rejects `start_date > end_date` before writing.
    pub async fn set_habit_period(&self, habit_id: &str, period: Period) -> Result<Period> {
        period.validate()?;
        self.require_habit(habit_id).await?;
        let stored = self.habits.upsert_period(habit_id, &period).await?;
        info!(habit_id, "Habit period set");
        Ok(stored)
    }

    pub async fn delete_habit_period(&self, habit_id: &str) -> Result<bool> {
        self.habits.delete_period(habit_id).await
    }

    async fn require_habit(&self, habit_id: &str) -> Result<Habit> {
        self.habits.find_habit(habit_id).await?.ok_or(RoutinelyError::NotFound(Entity::Habit))
    }
}
