//! Domain constants
//!
//! Limits enforced by the habit and catalog services.

// Habit schedule limits
pub const MAX_TIMINGS_PER_HABIT: usize = 10;
pub const MAX_REMINDERS_PER_HABIT: usize = 5;
pub const MAX_TIMING_LABEL_LENGTH: usize = 50;
pub const MIN_REMINDER_BEFORE_MINUTES: u32 = 1;
/// One week.
pub const MAX_REMINDER_BEFORE_MINUTES: u32 = 10_080;

// Name lengths
pub const MAX_HABIT_NAME_LENGTH: usize = 100;
pub const MAX_CATALOG_NAME_LENGTH: usize = 200;

// Storage defaults
pub const DEFAULT_DB_PATH: &str = "routinely.db";
pub const DEFAULT_POOL_SIZE: u32 = 8;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";
