//! Habit scheduling model
//!
//! Pure data describing how a habit recurs ([`Frequency`]), when in the day it
//! is expected ([`Timing`]), how far ahead to notify ([`Reminder`]) and the
//! window during which it applies ([`Period`]). Dates are plain calendar
//! dates; no timezone handling happens here.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_HABIT_NAME_LENGTH, MAX_REMINDERS_PER_HABIT, MAX_REMINDER_BEFORE_MINUTES,
    MAX_TIMINGS_PER_HABIT, MAX_TIMING_LABEL_LENGTH, MIN_REMINDER_BEFORE_MINUTES,
};
use crate::errors::{Result, RoutinelyError};
use crate::impl_domain_status_conversions;

static TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap_or_else(|_| unreachable!())
});

/// A user-owned recurring task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category: String,
    /// `None` while the habit is active.
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    /// Whether the habit has been soft-deleted.
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Day of the week as stored and exchanged (`"monday"` … `"sunday"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl_domain_status_conversions!(Weekday {
    Monday => "monday",
    Tuesday => "tuesday",
    Wednesday => "wednesday",
    Thursday => "thursday",
    Friday => "friday",
    Saturday => "saturday",
    Sunday => "sunday",
});

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// Discriminant of [`Frequency`], stored alongside the serialized rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyKind {
    Daily,
    Weekly,
    Monthly,
    Interval,
}

impl_domain_status_conversions!(FrequencyKind {
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
    Interval => "interval",
});

/// Recurrence rule of a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly {
        #[serde(rename = "daysOfWeek")]
        days_of_week: Vec<Weekday>,
    },
    Monthly {
        /// 1–31, no calendar validation: day 31 never matches a 30-day month.
        #[serde(rename = "daysOfMonth")]
        days_of_month: Vec<u32>,
    },
    Interval {
        #[serde(rename = "intervalDays")]
        interval_days: u32,
    },
}

impl Frequency {
    /// Discriminant of this rule.
    pub fn kind(&self) -> FrequencyKind {
        match self {
            Self::Daily => FrequencyKind::Daily,
            Self::Weekly { .. } => FrequencyKind::Weekly,
            Self::Monthly { .. } => FrequencyKind::Monthly,
            Self::Interval { .. } => FrequencyKind::Interval,
        }
    }

    /// Reject shapes the scheduling model cannot represent.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Daily => Ok(()),
            Self::Weekly { days_of_week } => {
                if days_of_week.is_empty() {
                    return Err(RoutinelyError::InvalidInput(
                        "weekly frequency needs at least one weekday".into(),
                    ));
                }
                Ok(())
            }
            Self::Monthly { days_of_month } => {
                if days_of_month.is_empty() {
                    return Err(RoutinelyError::InvalidInput(
                        "monthly frequency needs at least one day".into(),
                    ));
                }
                if let Some(day) = days_of_month.iter().find(|d| !(1..=31).contains(*d)) {
                    return Err(RoutinelyError::InvalidInput(format!(
                        "day of month out of range: {day}"
                    )));
                }
                Ok(())
            }
            Self::Interval { interval_days } => {
                if *interval_days < 1 {
                    return Err(RoutinelyError::InvalidInput(
                        "interval must be at least one day".into(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Whether the rule schedules the habit on `date`.
    ///
    /// `anchor` is the first day of an interval cycle; dates before it never
    /// match an interval rule.
    pub fn is_due_on(&self, date: NaiveDate, anchor: NaiveDate) -> bool {
        match self {
            Self::Daily => true,
            Self::Weekly { days_of_week } => days_of_week.contains(&Weekday::from(date.weekday())),
            Self::Monthly { days_of_month } => days_of_month.contains(&date.day()),
            Self::Interval { interval_days } => {
                if *interval_days == 0 || date < anchor {
                    return false;
                }
                (date - anchor).num_days() % i64::from(*interval_days) == 0
            }
        }
    }
}

/// A time-of-day slot at which a habit is expected to be performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub id: String,
    pub habit_id: String,
    /// `HH:MM`, 24h.
    pub time: String,
    pub label: Option<String>,
}

/// New timing as supplied to the replace-all setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingInput {
    pub time: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl TimingInput {
    /// Convenience constructor for an unlabeled timing.
    pub fn at(time: impl Into<String>) -> Self {
        Self { time: time.into(), label: None }
    }

    pub fn validate(&self) -> Result<()> {
        if !TIME_OF_DAY.is_match(&self.time) {
            return Err(RoutinelyError::InvalidInput(format!(
                "time must be HH:MM, got {}",
                self.time
            )));
        }
        if let Some(label) = &self.label {
            if label.chars().count() > MAX_TIMING_LABEL_LENGTH {
                return Err(RoutinelyError::InvalidInput(format!(
                    "timing label longer than {MAX_TIMING_LABEL_LENGTH} characters"
                )));
            }
        }
        Ok(())
    }
}

/// Lead-time notification setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub habit_id: String,
    pub before_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderInput {
    pub before_minutes: u32,
}

impl ReminderInput {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_REMINDER_BEFORE_MINUTES..=MAX_REMINDER_BEFORE_MINUTES)
            .contains(&self.before_minutes)
        {
            return Err(RoutinelyError::InvalidInput(format!(
                "reminder lead time must be between {MIN_REMINDER_BEFORE_MINUTES} and \
                 {MAX_REMINDER_BEFORE_MINUTES} minutes"
            )));
        }
        Ok(())
    }
}

/// Date range and active months during which a habit applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Months 1–12; `None` means every month.
    #[serde(default)]
    pub active_months: Option<Vec<u32>>,
}

impl Period {
    /// Enforce `start_date <= end_date` and months within 1–12.
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(RoutinelyError::InvalidDateRange { start, end });
            }
        }
        if let Some(month) =
            self.active_months.iter().flatten().find(|m| !(1..=12).contains(*m))
        {
            return Err(RoutinelyError::InvalidInput(format!("month out of range: {month}")));
        }
        Ok(())
    }

    /// Whether the period lets the habit apply on `date`.
    pub fn permits(&self, date: NaiveDate) -> bool {
        if let Some(months) = &self.active_months {
            if !months.contains(&date.month()) {
                return false;
            }
        }
        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }
        true
    }
}

/// Input for creating a habit together with its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitInput {
    pub user_id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub timings: Vec<TimingInput>,
    #[serde(default)]
    pub reminders: Vec<ReminderInput>,
    #[serde(default)]
    pub period: Option<Period>,
}

impl CreateHabitInput {
    /// Validate the habit and every sub-entity before anything is written.
    pub fn validate(&self) -> Result<()> {
        validate_habit_name(&self.name)?;
        if let Some(frequency) = &self.frequency {
            frequency.validate()?;
        }
        validate_timings(&self.timings)?;
        validate_reminders(&self.reminders)?;
        if let Some(period) = &self.period {
            period.validate()?;
        }
        Ok(())
    }
}

/// Check a replacement timing set against the per-habit limit and format.
pub fn validate_timings(timings: &[TimingInput]) -> Result<()> {
    if timings.len() > MAX_TIMINGS_PER_HABIT {
        return Err(RoutinelyError::InvalidInput(format!(
            "at most {MAX_TIMINGS_PER_HABIT} timings per habit"
        )));
    }
    timings.iter().try_for_each(TimingInput::validate)
}

/// Check a replacement reminder set against the per-habit limit and range.
pub fn validate_reminders(reminders: &[ReminderInput]) -> Result<()> {
    if reminders.len() > MAX_REMINDERS_PER_HABIT {
        return Err(RoutinelyError::InvalidInput(format!(
            "at most {MAX_REMINDERS_PER_HABIT} reminders per habit"
        )));
    }
    reminders.iter().try_for_each(ReminderInput::validate)
}

fn validate_habit_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RoutinelyError::InvalidInput("habit name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_HABIT_NAME_LENGTH {
        return Err(RoutinelyError::InvalidInput(format!(
            "habit name longer than {MAX_HABIT_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Partial update of a habit's scalar fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl UpdateHabitInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        match &self.name {
            Some(name) => validate_habit_name(name),
            None => Ok(()),
        }
    }
}

/// A habit with all four schedule sub-records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitWithRelations {
    #[serde(flatten)]
    pub habit: Habit,
    pub frequency: Option<Frequency>,
    pub timings: Vec<Timing>,
    pub reminders: Vec<Reminder>,
    pub period: Option<Period>,
}
