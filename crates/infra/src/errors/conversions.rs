//! Conversions from external infrastructure errors into domain errors.

use routinely_common::storage::StorageError;
use routinely_domain::RoutinelyError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// `SQLITE_CONSTRAINT_UNIQUE`
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
/// `SQLITE_CONSTRAINT_PRIMARYKEY`
const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
/// `SQLITE_CONSTRAINT_FOREIGNKEY`
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RoutinelyError);

impl From<InfraError> for RoutinelyError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RoutinelyError> for InfraError {
    fn from(value: RoutinelyError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoRoutinelyError {
    fn into_routinely(self) -> RoutinelyError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → RoutinelyError */
/* -------------------------------------------------------------------------- */

impl IntoRoutinelyError for SqlError {
    fn into_routinely(self) -> RoutinelyError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        RoutinelyError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        RoutinelyError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_UNIQUE)
                    | (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_PRIMARYKEY) => {
                        RoutinelyError::Database(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, SQLITE_CONSTRAINT_FOREIGNKEY) => {
                        RoutinelyError::Database("foreign key constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, _) => {
                        RoutinelyError::Database(format!("constraint violation: {message}"))
                    }
                    _ => RoutinelyError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => RoutinelyError::Database("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                RoutinelyError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                RoutinelyError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                RoutinelyError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidParameterName(parameter_name) => {
                RoutinelyError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => RoutinelyError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => RoutinelyError::Database("invalid SQL query".into()),
            other => RoutinelyError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_routinely())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → RoutinelyError */
/* -------------------------------------------------------------------------- */

impl IntoRoutinelyError for StorageError {
    fn into_routinely(self) -> RoutinelyError {
        match self {
            StorageError::Rusqlite(err) => err.into_routinely(),
            StorageError::InvalidConfig(message) => RoutinelyError::Config(message),
            StorageError::Timeout(secs) => {
                RoutinelyError::Database(format!("timed out after {secs}s waiting for a connection"))
            }
            other => RoutinelyError::Database(other.to_string()),
        }
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(value.into_routinely())
    }
}

/* -------------------------------------------------------------------------- */
/* Helpers used by the adapters */
/* -------------------------------------------------------------------------- */

/// `map_err` adapter for rusqlite results.
pub fn sql_error(err: SqlError) -> RoutinelyError {
    InfraError::from(err).into()
}

/// `map_err` adapter for pool and wrapper results.
pub fn storage_error(err: StorageError) -> RoutinelyError {
    InfraError::from(err).into()
}

/// Map JoinError from spawn_blocking to RoutinelyError.
pub fn map_join_error(err: JoinError) -> RoutinelyError {
    if err.is_cancelled() {
        RoutinelyError::Internal("blocking task cancelled".into())
    } else {
        RoutinelyError::Internal(format!("blocking task failed: {err}"))
    }
}

/// UNIQUE or PRIMARY KEY constraint failure.
pub fn is_unique_violation(err: &SqlError) -> bool {
    matches!(
        err.sqlite_error(),
        Some(e) if e.extended_code == SQLITE_CONSTRAINT_UNIQUE
            || e.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// FOREIGN KEY constraint failure.
pub fn is_foreign_key_violation(err: &SqlError) -> bool {
    matches!(err.sqlite_error(), Some(e) if e.extended_code == SQLITE_CONSTRAINT_FOREIGNKEY)
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use rusqlite::ffi::{Error as FfiError, ErrorCode};

    use super::*;

    fn failure(code: ErrorCode, extended_code: i32) -> SqlError {
        SqlError::SqliteFailure(FfiError { code, extended_code }, Some("boom".into()))
    }

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let mapped = sql_error(failure(ErrorCode::DatabaseBusy, 5));
        match mapped {
            RoutinelyError::Database(msg) => assert!(msg.contains("busy")),
            other => panic!("expected database error, got {other:?}"),
        }
    }

    #[test]
    fn constraint_codes_are_classified() {
        assert!(is_unique_violation(&failure(ErrorCode::ConstraintViolation, 2067)));
        assert!(is_unique_violation(&failure(ErrorCode::ConstraintViolation, 1555)));
        assert!(!is_unique_violation(&failure(ErrorCode::ConstraintViolation, 787)));
        assert!(is_foreign_key_violation(&failure(ErrorCode::ConstraintViolation, 787)));
        assert!(!is_unique_violation(&SqlError::QueryReturnedNoRows));
    }

    #[test]
    fn storage_timeout_maps_to_database_error() {
        let mapped = storage_error(StorageError::Timeout(30));
        assert_eq!(mapped.code(), "database_error");
        assert!(mapped.to_string().contains("30s"));
    }

    #[test]
    fn invalid_storage_config_maps_to_config_error() {
        let mapped = storage_error(StorageError::InvalidConfig("pool_size".into()));
        assert_eq!(mapped, RoutinelyError::Config("pool_size".into()));
    }
}
