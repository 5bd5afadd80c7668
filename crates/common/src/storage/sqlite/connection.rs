//! Pooled SQLite connection wrapper

use std::ops::{Deref, DerefMut};

use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{
    Connection as RusqliteConnection, Params, Row, Statement as RusqliteStatement, Transaction,
    TransactionBehavior,
};
use tracing::instrument;

use crate::storage::error::{StorageError, StorageResult};

/// Pooled connection; returned to the pool on drop.
pub struct SqliteConnection {
    inner: PooledConnection<SqliteConnectionManager>,
}

impl SqliteConnection {
    pub fn new(conn: PooledConnection<SqliteConnectionManager>) -> Self {
        Self { inner: conn }
    }

    /// Underlying rusqlite connection
    pub fn inner(&self) -> &RusqliteConnection {
        &self.inner
    }

    /// Execute a statement that doesn't return rows
    #[instrument(skip(self, params), fields(sql = %sql))]
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> StorageResult<usize> {
        self.inner.execute(sql, params).map_err(StorageError::from)
    }

    /// Execute a query that returns a single row
    #[instrument(skip(self, params, f), fields(sql = %sql))]
    pub fn query_row<T, P, F>(&self, sql: &str, params: P, f: F) -> StorageResult<T>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> Result<T, rusqlite::Error>,
    {
        self.inner.query_row(sql, params, f).map_err(StorageError::from)
    }

    /// Prepare a statement for repeated execution
    #[instrument(skip(self), fields(sql = %sql))]
    pub fn prepare(&self, sql: &str) -> StorageResult<SqliteStatement<'_>> {
        let stmt = self.inner.prepare(sql).map_err(StorageError::from)?;
        Ok(SqliteStatement::new(stmt))
    }

    /// Begin a transaction. Dropping it without `commit` rolls back.
    #[instrument(skip(self))]
    pub fn transaction(&mut self) -> StorageResult<Transaction<'_>> {
        self.inner.transaction().map_err(StorageError::from)
    }

    /// Begin a transaction that takes the write lock up front.
    ///
    /// Required when the transaction reads before it writes: a deferred
    /// transaction cannot upgrade its read snapshot under WAL once another
    /// writer has committed, and fails with `SQLITE_BUSY` without waiting.
    #[instrument(skip(self))]
    pub fn immediate_transaction(&mut self) -> StorageResult<Transaction<'_>> {
        self.inner
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)
    }
}

impl Deref for SqliteConnection {
    type Target = RusqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for SqliteConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

/// Prepared statement wrapper
pub struct SqliteStatement<'conn> {
    inner: RusqliteStatement<'conn>,
}

impl<'conn> SqliteStatement<'conn> {
    pub fn new(stmt: RusqliteStatement<'conn>) -> Self {
        Self { inner: stmt }
    }

    pub fn execute<P: Params>(&mut self, params: P) -> StorageResult<usize> {
        self.inner.execute(params).map_err(StorageError::from)
    }

    /// Run the query and collect every mapped row
    pub fn query_map<T, P, F>(&mut self, params: P, f: F) -> StorageResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
    {
        let rows = self.inner.query_map(params, f).map_err(StorageError::from)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for storage::sqlite::connection.
    use rusqlite::params;
    use tempfile::TempDir;

    use crate::storage::{SqlitePool, StorageConfig};

    fn pool(dir: &TempDir) -> SqlitePool {
        SqlitePool::new(&StorageConfig::new(dir.path().join("test.db"))).unwrap()
    }

    #[test]
    fn test_connection_execute_and_query_row() {
        let temp_dir = TempDir::new().unwrap();
        let pool = pool(&temp_dir);
        let conn = pool.get_sqlite_connection().unwrap();

        conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)", []).unwrap();
        let inserted = conn.execute("INSERT INTO test (name) VALUES (?1)", params!["Bob"]).unwrap();
        assert_eq!(inserted, 1);

        let name: String =
            conn.query_row("SELECT name FROM test WHERE id = ?1", params![1], |row| row.get(0))
                .unwrap();
        assert_eq!(name, "Bob");
    }

    #[test]
    fn test_prepared_statement_query_map() {
        let temp_dir = TempDir::new().unwrap();
        let pool = pool(&temp_dir);
        let conn = pool.get_sqlite_connection().unwrap();

        conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)", []).unwrap();
        let mut insert = conn.prepare("INSERT INTO test (name) VALUES (?1)").unwrap();
        insert.execute(params!["Charlie"]).unwrap();
        insert.execute(params!["Diana"]).unwrap();

        let mut select = conn.prepare("SELECT name FROM test ORDER BY id").unwrap();
        let names: Vec<String> = select.query_map([], |row| row.get(0)).unwrap();
        assert_eq!(names, vec!["Charlie".to_string(), "Diana".to_string()]);
    }

    #[test]
    fn test_transaction_rolls_back_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let pool = pool(&temp_dir);
        let mut conn = pool.get_sqlite_connection().unwrap();

        conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)", []).unwrap();
        {
            let tx = conn.transaction().unwrap();
            tx.execute("INSERT INTO test (id) VALUES (1)", []).unwrap();
        }

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM test", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_immediate_transaction_holds_write_lock() {
        let temp_dir = TempDir::new().unwrap();
        let pool = pool(&temp_dir);
        let mut writer = pool.get_sqlite_connection().unwrap();
        let other = pool.get_sqlite_connection().unwrap();
        writer.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)", []).unwrap();
        other.busy_timeout(std::time::Duration::ZERO).unwrap();

        let tx = writer.immediate_transaction().unwrap();
        assert!(other.execute("INSERT INTO test (id) VALUES (2)", []).is_err());
        tx.execute("INSERT INTO test (id) VALUES (1)", []).unwrap();
        tx.commit().unwrap();

        other.execute("INSERT INTO test (id) VALUES (2)", []).unwrap();
        let count: i64 = other.query_row("SELECT COUNT(*) FROM test", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 2);
    }
}
