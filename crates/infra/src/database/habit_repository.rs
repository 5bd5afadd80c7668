//! SQLite-backed habit repository.
//!
//! Implements `HabitRepository` for habits and their frequency, timing,
//! reminder and period sub-records. All database operations run in
//! `spawn_blocking` to avoid blocking the async runtime.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use routinely_core::HabitRepository;
use routinely_domain::{
    CreateHabitInput, Entity, Frequency, Habit, Period, Reminder, ReminderInput,
    Result as DomainResult, RoutinelyError, Timing, TimingInput, UpdateHabitInput,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::blocking::with_connection;
use super::manager::DbManager;
use super::rows::{from_json, from_millis, new_id, opt_from_millis, to_json, to_millis};
use crate::errors::{is_foreign_key_violation, sql_error, storage_error};

const HABIT_COLUMNS: &str = "id, user_id, name, category, archived_at, created_at, updated_at";

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository {
    db: Arc<DbManager>,
}

impl SqliteHabitRepository {
    /// Create a new repository with the given database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HabitRepository for SqliteHabitRepository {
    async fn create_habit(&self, input: &CreateHabitInput) -> DomainResult<Habit> {
        let input = input.clone();
        with_connection(&self.db, move |conn| {
            let tx = conn.transaction().map_err(storage_error)?;
            let habit = insert_habit(&tx, &input).map_err(sql_error)?;
            if let Some(frequency) = &input.frequency {
                upsert_frequency(&tx, &habit.id, frequency).map_err(sql_error)?;
            }
            insert_timings(&tx, &habit.id, &input.timings).map_err(sql_error)?;
            insert_reminders(&tx, &habit.id, &input.reminders).map_err(sql_error)?;
            if let Some(period) = &input.period {
                upsert_period(&tx, &habit.id, period).map_err(sql_error)?;
            }
            tx.commit().map_err(sql_error)?;
            info!(habit_id = %habit.id, user_id = %habit.user_id, "habit inserted with sub-records");
            Ok(habit)
        })
        .await
    }

    async fn find_habit(&self, id: &str) -> DomainResult<Option<Habit>> {
        let id = id.to_owned();
        with_connection(&self.db, move |conn| query_habit(conn, &id).map_err(sql_error)).await
    }

    async fn list_active_habits(&self, user_id: &str) -> DomainResult<Vec<Habit>> {
        let user_id = user_id.to_owned();
        with_connection(&self.db, move |conn| {
            let habits = query_active_habits(conn, &user_id).map_err(sql_error)?;
            debug!(user_id = %user_id, count = habits.len(), "listed active habits");
            Ok(habits)
        })
        .await
    }

    async fn update_habit(
        &self,
        id: &str,
        patch: &UpdateHabitInput,
    ) -> DomainResult<Option<Habit>> {
        let id = id.to_owned();
        let patch = patch.clone();
        with_connection(&self.db, move |conn| {
            if update_habit_row(conn, &id, &patch).map_err(sql_error)? == 0 {
                return Ok(None);
            }
            query_habit(conn, &id).map_err(sql_error)
        })
        .await
    }

    async fn set_archived_at(
        &self,
        id: &str,
        archived_at: Option<DateTime<Utc>>,
    ) -> DomainResult<Option<Habit>> {
        let id = id.to_owned();
        with_connection(&self.db, move |conn| {
            if update_archived_at(conn, &id, archived_at).map_err(sql_error)? == 0 {
                return Ok(None);
            }
            query_habit(conn, &id).map_err(sql_error)
        })
        .await
    }

    async fn delete_habit(&self, id: &str) -> DomainResult<bool> {
        let id = id.to_owned();
        with_connection(&self.db, move |conn| {
            delete_by_key(conn, "DELETE FROM habits WHERE id = ?1", &id).map_err(sql_error)
        })
        .await
    }

    async fn get_frequency(&self, habit_id: &str) -> DomainResult<Option<Frequency>> {
        let habit_id = habit_id.to_owned();
        with_connection(&self.db, move |conn| query_frequency(conn, &habit_id).map_err(sql_error))
            .await
    }

    async fn upsert_frequency(
        &self,
        habit_id: &str,
        frequency: &Frequency,
    ) -> DomainResult<Frequency> {
        let habit_id = habit_id.to_owned();
        let frequency = frequency.clone();
        with_connection(&self.db, move |conn| {
            upsert_frequency(conn, &habit_id, &frequency).map_err(map_child_error)?;
            Ok(frequency)
        })
        .await
    }

    async fn delete_frequency(&self, habit_id: &str) -> DomainResult<bool> {
        let habit_id = habit_id.to_owned();
        with_connection(&self.db, move |conn| {
            delete_by_key(conn, "DELETE FROM habit_frequencies WHERE habit_id = ?1", &habit_id)
                .map_err(sql_error)
        })
        .await
    }

    async fn get_timings(&self, habit_id: &str) -> DomainResult<Vec<Timing>> {
        let habit_id = habit_id.to_owned();
        with_connection(&self.db, move |conn| query_timings(conn, &habit_id).map_err(sql_error))
            .await
    }

    async fn replace_timings(
        &self,
        habit_id: &str,
        timings: &[TimingInput],
    ) -> DomainResult<Vec<Timing>> {
        let habit_id = habit_id.to_owned();
        let timings = timings.to_vec();
        with_connection(&self.db, move |conn| {
            let tx = conn.transaction().map_err(storage_error)?;
            delete_by_key(&tx, "DELETE FROM habit_timings WHERE habit_id = ?1", &habit_id)
                .map_err(sql_error)?;
            insert_timings(&tx, &habit_id, &timings).map_err(map_child_error)?;
            let stored = query_timings(&tx, &habit_id).map_err(sql_error)?;
            tx.commit().map_err(sql_error)?;
            Ok(stored)
        })
        .await
    }

    async fn get_reminders(&self, habit_id: &str) -> DomainResult<Vec<Reminder>> {
        let habit_id = habit_id.to_owned();
        with_connection(&self.db, move |conn| query_reminders(conn, &habit_id).map_err(sql_error))
            .await
    }

    async fn replace_reminders(
        &self,
        habit_id: &str,
        reminders: &[ReminderInput],
    ) -> DomainResult<Vec<Reminder>> {
        let habit_id = habit_id.to_owned();
        let reminders = reminders.to_vec();
        with_connection(&self.db, move |conn| {
            let tx = conn.transaction().map_err(storage_error)?;
            delete_by_key(&tx, "DELETE FROM habit_reminders WHERE habit_id = ?1", &habit_id)
                .map_err(sql_error)?;
            insert_reminders(&tx, &habit_id, &reminders).map_err(map_child_error)?;
            let stored = query_reminders(&tx, &habit_id).map_err(sql_error)?;
            tx.commit().map_err(sql_error)?;
            Ok(stored)
        })
        .await
    }

    async fn get_period(&self, habit_id: &str) -> DomainResult<Option<Period>> {
        let habit_id = habit_id.to_owned();
        with_connection(&self.db, move |conn| query_period(conn, &habit_id).map_err(sql_error))
            .await
    }

    async fn upsert_period(&self, habit_id: &str, period: &Period) -> DomainResult<Period> {
        let habit_id = habit_id.to_owned();
        let period = period.clone();
        with_connection(&self.db, move |conn| {
            upsert_period(conn, &habit_id, &period).map_err(map_child_error)?;
            Ok(period)
        })
        .await
    }

    async fn delete_period(&self, habit_id: &str) -> DomainResult<bool> {
        let habit_id = habit_id.to_owned();
        with_connection(&self.db, move |conn| {
            delete_by_key(conn, "DELETE FROM habit_periods WHERE habit_id = ?1", &habit_id)
                .map_err(sql_error)
        })
        .await
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn insert_habit(conn: &Connection, input: &CreateHabitInput) -> rusqlite::Result<Habit> {
    let now = Utc::now();
    let habit = Habit {
        id: new_id(),
        user_id: input.user_id.clone(),
        name: input.name.trim().to_owned(),
        category: input.category.clone(),
        archived_at: None,
        created_at: now,
        updated_at: now,
    };
    conn.execute(
        "INSERT INTO habits (id, user_id, name, category, archived_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?5)",
        params![habit.id, habit.user_id, habit.name, habit.category, to_millis(now)],
    )?;
    // Re-read so the returned value carries the stored millisecond precision.
    conn.query_row(
        &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
        params![habit.id],
        map_habit,
    )
}

fn query_habit(conn: &Connection, id: &str) -> rusqlite::Result<Option<Habit>> {
    conn.query_row(
        &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
        params![id],
        map_habit,
    )
    .optional()
}

fn query_active_habits(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<Habit>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {HABIT_COLUMNS} FROM habits
         WHERE user_id = ?1 AND archived_at IS NULL
         ORDER BY created_at, id"
    ))?;
    let rows = stmt.query_map(params![user_id], map_habit)?;
    rows.collect()
}

fn update_habit_row(conn: &Connection, id: &str, patch: &UpdateHabitInput) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE habits SET
            name = COALESCE(?2, name),
            category = COALESCE(?3, category),
            updated_at = ?4
         WHERE id = ?1",
        params![
            id,
            patch.name.as_deref().map(str::trim),
            patch.category,
            to_millis(Utc::now())
        ],
    )
}

fn update_archived_at(
    conn: &Connection,
    id: &str,
    archived_at: Option<DateTime<Utc>>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE habits SET archived_at = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, archived_at.map(to_millis), to_millis(Utc::now())],
    )
}

/// Run a single-key DELETE; true when a row went away.
fn delete_by_key(conn: &Connection, sql: &str, key: &str) -> rusqlite::Result<bool> {
    Ok(conn.execute(sql, params![key])? > 0)
}

fn query_frequency(conn: &Connection, habit_id: &str) -> rusqlite::Result<Option<Frequency>> {
    conn.query_row(
        "SELECT config FROM habit_frequencies WHERE habit_id = ?1",
        params![habit_id],
        |row| from_json::<Frequency>(0, &row.get::<_, String>(0)?),
    )
    .optional()
}

fn query_period(conn: &Connection, habit_id: &str) -> rusqlite::Result<Option<Period>> {
    conn.query_row(
        "SELECT start_date, end_date, active_months FROM habit_periods WHERE habit_id = ?1",
        params![habit_id],
        map_period,
    )
    .optional()
}

/// The frequency row keeps the kind in its own column next to the JSON rule.
fn upsert_frequency(
    conn: &Connection,
    habit_id: &str,
    frequency: &Frequency,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO habit_frequencies (habit_id, kind, config, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(habit_id) DO UPDATE SET
            kind = excluded.kind,
            config = excluded.config,
            updated_at = excluded.updated_at",
        params![habit_id, frequency.kind().as_str(), to_json(frequency)?, to_millis(Utc::now())],
    )?;
    Ok(())
}

fn insert_timings(
    conn: &Connection,
    habit_id: &str,
    timings: &[TimingInput],
) -> rusqlite::Result<()> {
    let now = to_millis(Utc::now());
    let mut stmt = conn.prepare(
        "INSERT INTO habit_timings (id, habit_id, time, label, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for timing in timings {
        stmt.execute(params![new_id(), habit_id, timing.time, timing.label, now])?;
    }
    Ok(())
}

fn query_timings(conn: &Connection, habit_id: &str) -> rusqlite::Result<Vec<Timing>> {
    let mut stmt = conn.prepare(
        "SELECT id, habit_id, time, label FROM habit_timings
         WHERE habit_id = ?1
         ORDER BY time, created_at, id",
    )?;
    let rows = stmt.query_map(params![habit_id], |row| {
        Ok(Timing { id: row.get(0)?, habit_id: row.get(1)?, time: row.get(2)?, label: row.get(3)? })
    })?;
    rows.collect()
}

fn insert_reminders(
    conn: &Connection,
    habit_id: &str,
    reminders: &[ReminderInput],
) -> rusqlite::Result<()> {
    let now = to_millis(Utc::now());
    let mut stmt = conn.prepare(
        "INSERT INTO habit_reminders (id, habit_id, before_minutes, created_at)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for reminder in reminders {
        stmt.execute(params![new_id(), habit_id, reminder.before_minutes, now])?;
    }
    Ok(())
}

fn query_reminders(conn: &Connection, habit_id: &str) -> rusqlite::Result<Vec<Reminder>> {
    let mut stmt = conn.prepare(
        "SELECT id, habit_id, before_minutes FROM habit_reminders
         WHERE habit_id = ?1
         ORDER BY before_minutes, id",
    )?;
    let rows = stmt.query_map(params![habit_id], |row| {
        Ok(Reminder { id: row.get(0)?, habit_id: row.get(1)?, before_minutes: row.get(2)? })
    })?;
    rows.collect()
}

fn upsert_period(conn: &Connection, habit_id: &str, period: &Period) -> rusqlite::Result<()> {
    let active_months = period.active_months.as_ref().map(to_json).transpose()?;
    conn.execute(
        "INSERT INTO habit_periods (habit_id, start_date, end_date, active_months, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(habit_id) DO UPDATE SET
            start_date = excluded.start_date,
            end_date = excluded.end_date,
            active_months = excluded.active_months,
            updated_at = excluded.updated_at",
        params![
            habit_id,
            period.start_date,
            period.end_date,
            active_months,
            to_millis(Utc::now())
        ],
    )?;
    Ok(())
}

fn map_habit(row: &Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        archived_at: opt_from_millis(4, row.get(4)?)?,
        created_at: from_millis(5, row.get(5)?)?,
        updated_at: from_millis(6, row.get(6)?)?,
    })
}

fn map_period(row: &Row<'_>) -> rusqlite::Result<Period> {
    let active_months: Option<String> = row.get(2)?;
    Ok(Period {
        start_date: row.get(0)?,
        end_date: row.get(1)?,
        active_months: active_months.map(|text| from_json(2, &text)).transpose()?,
    })
}

/// Sub-record writes against a missing habit fail the foreign key.
fn map_child_error(err: rusqlite::Error) -> RoutinelyError {
    if is_foreign_key_violation(&err) {
        RoutinelyError::NotFound(Entity::Habit)
    } else {
        sql_error(err)
    }
}
