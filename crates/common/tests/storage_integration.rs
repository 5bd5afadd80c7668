//! Integration tests for storage module
//!
//! These tests verify end-to-end storage workflows including:
//! - SQLite connection pooling with per-connection pragmas
//! - Transaction handling
//! - Foreign key enforcement
//! - Health checks and metrics

#![cfg(feature = "platform")]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::params;
use routinely_common::storage::{
    ConnectionPool, SqlitePool, StorageConfig, StorageError, StorageResult,
};
use tempfile::TempDir;

// ============================================================================
// Test Helper Functions
// ============================================================================

fn temp_db_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    (temp_dir, db_path)
}

fn test_pool(db_path: &std::path::Path) -> StorageResult<SqlitePool> {
    let config = StorageConfig::builder(db_path)
        .pool_size(4)
        .busy_timeout(Duration::from_millis(500))
        .build()?;
    SqlitePool::new(&config)
}

// ============================================================================
// Pool Tests
// ============================================================================

#[test]
fn test_pool_persists_across_reopen() {
    let (_dir, db_path) = temp_db_path();

    {
        let pool = test_pool(&db_path).unwrap();
        let conn = pool.get_sqlite_connection().unwrap();
        conn.execute("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT NOT NULL)", [])
            .unwrap();
        conn.execute("INSERT INTO notes (body) VALUES (?1)", params!["persisted"]).unwrap();
    }

    let pool = test_pool(&db_path).unwrap();
    let conn = pool.get_sqlite_connection().unwrap();
    let body: String = conn.query_row("SELECT body FROM notes", [], |row| row.get(0)).unwrap();
    assert_eq!(body, "persisted");
}

#[test]
fn test_foreign_keys_enforced_on_every_connection() {
    let (_dir, db_path) = temp_db_path();
    let pool = test_pool(&db_path).unwrap();

    {
        let conn = pool.get_sqlite_connection().unwrap();
        conn.execute_batch(
            "CREATE TABLE parent (id TEXT PRIMARY KEY);
             CREATE TABLE child (
                 id TEXT PRIMARY KEY,
                 parent_id TEXT NOT NULL REFERENCES parent(id) ON DELETE CASCADE
             );",
        )
        .unwrap();
    }

    // Hold several connections so the insert runs on a fresh one
    let _held: Vec<_> = (0..3).map(|_| pool.get_sqlite_connection().unwrap()).collect();
    let conn = pool.get_sqlite_connection().unwrap();
    let err = conn
        .execute("INSERT INTO child (id, parent_id) VALUES ('c1', 'missing')", [])
        .unwrap_err();

    let sqlite_err = err.as_rusqlite().and_then(rusqlite::Error::sqlite_error).unwrap();
    assert_eq!(sqlite_err.extended_code, 787, "FOREIGN KEY constraint failure");
}

#[test]
fn test_transaction_commit_is_visible_to_other_connections() {
    let (_dir, db_path) = temp_db_path();
    let pool = Arc::new(test_pool(&db_path).unwrap());

    let mut writer = pool.get_sqlite_connection().unwrap();
    writer.execute("CREATE TABLE counters (name TEXT PRIMARY KEY, value INTEGER)", []).unwrap();

    let tx = writer.transaction().unwrap();
    tx.execute("INSERT INTO counters VALUES ('a', 1)", []).unwrap();
    tx.execute("INSERT INTO counters VALUES ('b', 2)", []).unwrap();
    tx.commit().unwrap();

    let reader = pool.get_sqlite_connection().unwrap();
    let total: i64 =
        reader.query_row("SELECT SUM(value) FROM counters", [], |row| row.get(0)).unwrap();
    assert_eq!(total, 3);
}

#[test]
fn test_unique_violation_surfaces_extended_code() {
    let (_dir, db_path) = temp_db_path();
    let pool = test_pool(&db_path).unwrap();
    let conn = pool.get_sqlite_connection().unwrap();

    conn.execute("CREATE TABLE slugs (slug TEXT NOT NULL UNIQUE)", []).unwrap();
    conn.execute("INSERT INTO slugs VALUES ('retinol')", []).unwrap();
    let err = conn.execute("INSERT INTO slugs VALUES ('retinol')", []).unwrap_err();

    assert!(matches!(err, StorageError::Rusqlite(_)));
    assert!(!err.is_retryable());
    let code = err.as_rusqlite().and_then(rusqlite::Error::sqlite_error).unwrap().extended_code;
    assert_eq!(code, 2067);
}

// ============================================================================
// Health & Metrics Tests
// ============================================================================

#[test]
fn test_health_and_metrics() {
    let (_dir, db_path) = temp_db_path();
    let pool = test_pool(&db_path).unwrap();

    for _ in 0..3 {
        let _conn = pool.get_sqlite_connection().unwrap();
    }

    let health = pool.health_check().unwrap();
    assert!(health.healthy);
    assert_eq!(health.max_connections, 4);

    let metrics = pool.metrics();
    assert_eq!(metrics.connections_acquired, 3);
    assert_eq!(metrics.connections_timeout, 0);
}

#[test]
fn test_pool_exhaustion_times_out() {
    let (_dir, db_path) = temp_db_path();
    let config = StorageConfig::builder(&db_path)
        .pool_size(1)
        .connection_timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let pool = SqlitePool::new(&config).unwrap();

    let _held = pool.get_sqlite_connection().unwrap();
    let err = pool.get_sqlite_connection().err().unwrap();

    assert!(err.is_retryable());
    assert_eq!(pool.metrics().connections_timeout + pool.metrics().connections_error, 1);
}
