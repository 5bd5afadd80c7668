//! Check ledger records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Completion state of a check. Only `Done` is produced by the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pending,
    #[default]
    Done,
    Skipped,
}

impl_domain_status_conversions!(CheckStatus {
    Pending => "pending",
    Done => "done",
    Skipped => "skipped",
});

/// One completion event of a habit on a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    pub id: String,
    pub user_id: String,
    pub habit_id: String,
    pub scheduled_date: NaiveDate,
    /// Timing this check satisfies. Becomes `None` if the timing is deleted.
    pub timing_id: Option<String>,
    pub actual_time: Option<String>,
    pub status: CheckStatus,
    pub completed_at: DateTime<Utc>,
}

/// Input of `check_habit` and `toggle_habit_check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInput {
    pub user_id: String,
    pub habit_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub timing_id: Option<String>,
    #[serde(default)]
    pub actual_time: Option<String>,
}

impl CheckInput {
    pub fn new(user_id: impl Into<String>, habit_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.into(),
            habit_id: habit_id.into(),
            date,
            timing_id: None,
            actual_time: None,
        }
    }

    #[must_use]
    pub fn with_timing(mut self, timing_id: impl Into<String>) -> Self {
        self.timing_id = Some(timing_id.into());
        self
    }

    /// Uniqueness slot of the check within its (habit, date) pair.
    ///
    /// The timing-agnostic check occupies the empty slot, distinct from every
    /// concrete timing.
    pub fn timing_slot(&self) -> &str {
        self.timing_id.as_deref().unwrap_or("")
    }
}

/// Outcome of a toggle: the check created, or `checked: false` if one was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResult {
    pub checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<Check>,
}

impl ToggleResult {
    pub const fn checked(check: Check) -> Self {
        Self { checked: true, check: Some(check) }
    }

    pub const fn unchecked() -> Self {
        Self { checked: false, check: None }
    }
}
