//! Check ledger - completion records with toggle semantics

use chrono::NaiveDate;
use routinely_domain::{Check, CheckInput, Entity, Result, RoutinelyError, ToggleResult};
use tracing::{debug, info, instrument};

use super::service::HabitService;

impl HabitService {
    /// Record a completion. A taken (habit, date, timing) slot fails with
    /// `check_creation_failed`.
    #[instrument(skip(self, input), fields(habit_id = %input.habit_id, date = %input.date))]
    pub async fn check_habit(&self, input: CheckInput) -> Result<Check> {
        self.require_timing_of_habit(&input).await?;
        let check = self
            .checks
            .insert_check(&input)
            .await?
            .ok_or(RoutinelyError::CreationFailed(Entity::Check))?;
        info!(check_id = %check.id, "Habit checked");
        Ok(check)
    }

    pub async fn uncheck_habit(&self, check_id: &str) -> Result<()> {
        if !self.checks.delete_check(check_id).await? {
            return Err(RoutinelyError::NotFound(Entity::Check));
        }
        info!(check_id, "Check removed");
        Ok(())
    }

    /// Remove every check of the habit on `date`.
    pub async fn uncheck_habit_by_date(&self, habit_id: &str, date: NaiveDate) -> Result<u64> {
        let removed = self.checks.delete_checks_on(habit_id, date).await?;
        if removed == 0 {
            return Err(RoutinelyError::NotFound(Entity::Check));
        }
        info!(habit_id, %date, removed, "Checks removed for date");
        Ok(removed)
    }

    /// Remove the check in the input's slot if present, otherwise create it.
    ///
    /// Not retried: if a concurrent toggle fills the slot between lookup and
    /// insert, this fails with `check_already_exists`.
    #[instrument(skip(self, input), fields(habit_id = %input.habit_id, date = %input.date))]
    pub async fn toggle_habit_check(&self, input: CheckInput) -> Result<ToggleResult> {
        let existing =
            self.checks.find_check(&input.habit_id, input.date, input.timing_slot()).await?;

        if let Some(check) = existing {
            if !self.checks.delete_check(&check.id).await? {
                return Err(RoutinelyError::DeleteFailed(Entity::Check));
            }
            info!(check_id = %check.id, "Toggle removed check");
            return Ok(ToggleResult::unchecked());
        }

        self.require_timing_of_habit(&input).await?;
        match self.checks.insert_check(&input).await? {
            Some(check) => {
                info!(check_id = %check.id, "Toggle created check");
                Ok(ToggleResult::checked(check))
            }
            None => {
                debug!("Toggle lost race on check slot");
                Err(RoutinelyError::AlreadyExists(Entity::Check))
            }
        }
    }

    pub async fn get_user_checks_for_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Check>> {
        self.checks.checks_for_user_on(user_id, date).await
    }

    /// Checks in `[start, end]`, ascending by date. An inverted range is
    /// empty, as in [`StatsEngine::count_habit_checks`].
    ///
    /// [`StatsEngine::count_habit_checks`]: super::StatsEngine::count_habit_checks
    pub async fn get_habit_checks(
        &self,
        habit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Check>> {
        if start > end {
            return Ok(Vec::new());
        }
        self.checks.checks_in_range(habit_id, start, end).await
    }

    pub async fn is_habit_checked(&self, habit_id: &str, date: NaiveDate) -> Result<bool> {
        self.checks.exists_on(habit_id, date).await
    }

    async fn require_timing_of_habit(&self, input: &CheckInput) -> Result<()> {
        let Some(timing_id) = &input.timing_id else {
            return Ok(());
        };
        let timings = self.habits.get_timings(&input.habit_id).await?;
        if timings.iter().any(|timing| &timing.id == timing_id) {
            Ok(())
        } else {
            Err(RoutinelyError::NotFound(Entity::Timing))
        }
    }
}
