//! SQLite pragma management
//!
//! Applies per-connection pragmas for concurrency and referential integrity.

use rusqlite::Connection;

use crate::storage::config::StorageConfig;
use crate::storage::error::{StorageError, StorageResult};

/// Apply connection-level pragmas
///
/// These pragmas are applied to each connection in the pool:
/// - WAL mode and autocheckpoint
/// - NORMAL synchronous mode
/// - Foreign key constraints (cascades and `SET NULL` depend on it)
/// - Busy timeout for lock contention
pub fn apply_connection_pragmas(conn: &Connection, config: &StorageConfig) -> StorageResult<()> {
    let mut pragma_sql = String::new();

    if config.enable_wal {
        pragma_sql.push_str("PRAGMA journal_mode=WAL;\n");
        pragma_sql.push_str("PRAGMA wal_autocheckpoint=1000;\n");
    }

    pragma_sql.push_str("PRAGMA synchronous=NORMAL;\n");

    if config.enable_foreign_keys {
        pragma_sql.push_str("PRAGMA foreign_keys=ON;\n");
    } else {
        pragma_sql.push_str("PRAGMA foreign_keys=OFF;\n");
    }

    conn.execute_batch(&pragma_sql)
        .map_err(|e| StorageError::Query(format!("Failed to apply pragmas: {e}")))?;

    conn.busy_timeout(config.busy_timeout)
        .map_err(|e| StorageError::Query(format!("Failed to set busy timeout: {e}")))?;

    Ok(())
}
