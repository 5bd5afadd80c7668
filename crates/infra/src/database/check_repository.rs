//! SQLite-backed check ledger.
//!
//! Slot uniqueness is enforced by `UNIQUE (habit_id, scheduled_date,
//! timing_slot)`; inserts use `ON CONFLICT DO NOTHING` so a taken slot comes
//! back as `None` instead of an error.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use routinely_core::CheckRepository;
use routinely_domain::{
    Check, CheckInput, CheckStatus, Entity, Result as DomainResult, RoutinelyError,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::blocking::with_connection;
use super::manager::DbManager;
use super::rows::{from_millis, new_id, to_millis};
use crate::errors::{is_foreign_key_violation, sql_error};

const CHECK_COLUMNS: &str =
    "id, user_id, habit_id, scheduled_date, timing_id, actual_time, status, completed_at";

/// SQLite-backed check repository.
pub struct SqliteCheckRepository {
    db: Arc<DbManager>,
}

impl SqliteCheckRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CheckRepository for SqliteCheckRepository {
    async fn insert_check(&self, input: &CheckInput) -> DomainResult<Option<Check>> {
        let input = input.clone();
        with_connection(&self.db, move |conn| {
            let inserted = insert_check(conn, &input).map_err(|err| {
                if is_foreign_key_violation(&err) {
                    RoutinelyError::NotFound(Entity::Habit)
                } else {
                    sql_error(err)
                }
            })?;
            if inserted.is_none() {
                debug!(habit_id = %input.habit_id, date = %input.date, slot = input.timing_slot(), "check slot already taken");
            }
            Ok(inserted)
        })
        .await
    }

    async fn delete_check(&self, id: &str) -> DomainResult<bool> {
        let id = id.to_owned();
        with_connection(&self.db, move |conn| {
            Ok(execute(conn, "DELETE FROM checks WHERE id = ?1", params![id])? > 0)
        })
        .await
    }

    async fn delete_checks_on(&self, habit_id: &str, date: NaiveDate) -> DomainResult<u64> {
        let habit_id = habit_id.to_owned();
        with_connection(&self.db, move |conn| {
            let removed = execute(
                conn,
                "DELETE FROM checks WHERE habit_id = ?1 AND scheduled_date = ?2",
                params![habit_id, date],
            )?;
            Ok(removed as u64)
        })
        .await
    }

    async fn find_check(
        &self,
        habit_id: &str,
        date: NaiveDate,
        timing_slot: &str,
    ) -> DomainResult<Option<Check>> {
        let habit_id = habit_id.to_owned();
        let timing_slot = timing_slot.to_owned();
        with_connection(&self.db, move |conn| {
            find_in_slot(conn, &habit_id, date, &timing_slot).map_err(sql_error)
        })
        .await
    }

    async fn checks_for_user_on(&self, user_id: &str, date: NaiveDate) -> DomainResult<Vec<Check>> {
        let user_id = user_id.to_owned();
        with_connection(&self.db, move |conn| {
            query_checks(
                conn,
                &format!(
                    "SELECT {CHECK_COLUMNS} FROM checks
                     WHERE user_id = ?1 AND scheduled_date = ?2
                     ORDER BY completed_at, id"
                ),
                params![user_id, date],
            )
            .map_err(sql_error)
        })
        .await
    }

    async fn checks_in_range(
        &self,
        habit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<Check>> {
        let habit_id = habit_id.to_owned();
        with_connection(&self.db, move |conn| {
            query_checks(
                conn,
                &format!(
                    "SELECT {CHECK_COLUMNS} FROM checks
                     WHERE habit_id = ?1 AND scheduled_date BETWEEN ?2 AND ?3
                     ORDER BY scheduled_date, completed_at, id"
                ),
                params![habit_id, start, end],
            )
            .map_err(sql_error)
        })
        .await
    }

    async fn count_in_range(
        &self,
        habit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<u64> {
        let habit_id = habit_id.to_owned();
        with_connection(&self.db, move |conn| {
            count_range(conn, &habit_id, start, end).map_err(sql_error)
        })
        .await
    }

    async fn checked_dates_desc(&self, habit_id: &str) -> DomainResult<Vec<NaiveDate>> {
        let habit_id = habit_id.to_owned();
        with_connection(&self.db, move |conn| distinct_dates_desc(conn, &habit_id).map_err(sql_error))
            .await
    }

    async fn exists_on(&self, habit_id: &str, date: NaiveDate) -> DomainResult<bool> {
        let habit_id = habit_id.to_owned();
        with_connection(&self.db, move |conn| {
            exists_on(conn, &habit_id, date).map_err(sql_error)
        })
        .await
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn execute<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> DomainResult<usize> {
    conn.execute(sql, params).map_err(sql_error)
}

fn insert_check(conn: &Connection, input: &CheckInput) -> rusqlite::Result<Option<Check>> {
    conn.query_row(
        &format!(
            "INSERT INTO checks
                (id, user_id, habit_id, scheduled_date, timing_id, timing_slot, actual_time, status, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(habit_id, scheduled_date, timing_slot) DO NOTHING
             RETURNING {CHECK_COLUMNS}"
        ),
        params![
            new_id(),
            input.user_id,
            input.habit_id,
            input.date,
            input.timing_id,
            input.timing_slot(),
            input.actual_time,
            CheckStatus::Done.as_str(),
            to_millis(Utc::now()),
        ],
        map_check,
    )
    .optional()
}

fn find_in_slot(
    conn: &Connection,
    habit_id: &str,
    date: NaiveDate,
    timing_slot: &str,
) -> rusqlite::Result<Option<Check>> {
    conn.query_row(
        &format!(
            "SELECT {CHECK_COLUMNS} FROM checks
             WHERE habit_id = ?1 AND scheduled_date = ?2 AND timing_slot = ?3"
        ),
        params![habit_id, date, timing_slot],
        map_check,
    )
    .optional()
}

fn query_checks<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> rusqlite::Result<Vec<Check>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_check)?;
    rows.collect()
}

fn count_range(
    conn: &Connection,
    habit_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM checks WHERE habit_id = ?1 AND scheduled_date BETWEEN ?2 AND ?3",
        params![habit_id, start, end],
        |row| row.get(0),
    )?;
    Ok(u64::try_from(count).unwrap_or_default())
}

fn distinct_dates_desc(conn: &Connection, habit_id: &str) -> rusqlite::Result<Vec<NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT scheduled_date FROM checks
         WHERE habit_id = ?1
         ORDER BY scheduled_date DESC",
    )?;
    let rows = stmt.query_map(params![habit_id], |row| row.get(0))?;
    rows.collect()
}

fn exists_on(conn: &Connection, habit_id: &str, date: NaiveDate) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM checks WHERE habit_id = ?1 AND scheduled_date = ?2)",
        params![habit_id, date],
        |row| row.get(0),
    )
}

fn map_check(row: &Row<'_>) -> rusqlite::Result<Check> {
    let status: String = row.get(6)?;
    Ok(Check {
        id: row.get(0)?,
        user_id: row.get(1)?,
        habit_id: row.get(2)?,
        scheduled_date: row.get(3)?,
        timing_id: row.get(4)?,
        actual_time: row.get(5)?,
        status: status.parse::<CheckStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, Type::Text, e.into())
        })?,
        completed_at: from_millis(7, row.get(7)?)?,
    })
}
