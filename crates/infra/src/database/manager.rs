//! Database connection manager backed by the shared SQLite pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use routinely_common::storage::{SqliteConnection, SqlitePool, StorageConfig};
use routinely_common::ConnectionPool;
use routinely_domain::{DatabaseConfig, Result, RoutinelyError};
use rusqlite::params;
use tracing::{debug, info};

use crate::errors::{sql_error, storage_error};

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Database manager that wraps an [`SqlitePool`].
pub struct DbManager {
    pool: Arc<SqlitePool>,
    path: PathBuf,
}

impl DbManager {
    /// Create a new manager with the given pool size.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32) -> Result<Self> {
        let config = StorageConfig::builder(db_path.as_ref())
            .pool_size(pool_size.max(1))
            .build()
            .map_err(storage_error)?;
        Self::with_storage_config(&config)
    }

    /// Create a manager from the application's database section.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let storage = StorageConfig::builder(&config.path)
            .pool_size(config.pool_size.max(1))
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .build()
            .map_err(storage_error)?;
        Self::with_storage_config(&storage)
    }

    fn with_storage_config(config: &StorageConfig) -> Result<Self> {
        let pool = SqlitePool::new(config).map_err(storage_error)?;

        info!(
            db_path = %config.path.display(),
            max_connections = config.pool_size,
            "sqlite pool initialised"
        );

        Ok(Self { pool: Arc::new(pool), path: config.path.clone() })
    }

    /// Borrow the underlying SQLite pool.
    pub fn pool(&self) -> &Arc<SqlitePool> {
        &self.pool
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<SqliteConnection> {
        self.pool.get_sqlite_connection().map_err(storage_error)
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        create_schema(&conn)?;
        info!(version = SCHEMA_VERSION, "schema up to date");
        Ok(())
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Perform a health check to verify database connectivity.
    ///
    /// Acquires a pooled connection and runs a trivial query.
    pub fn health_check(&self) -> Result<()> {
        {
            let conn = self.get_connection()?;
            conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))
                .map_err(storage_error)?;
        }
        let status = self.pool.health_check().map_err(storage_error)?;
        if !status.healthy {
            return Err(RoutinelyError::Database(
                status.message.unwrap_or_else(|| "pool unhealthy".to_owned()),
            ));
        }
        debug!(
            active = status.active_connections,
            idle = status.idle_connections,
            "database health check passed"
        );
        Ok(())
    }
}

fn create_schema(conn: &SqliteConnection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(sql_error)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, CAST(strftime('%s','now') AS INTEGER) * 1000)",
        params![SCHEMA_VERSION],
    )
    .map_err(storage_error)?;
    Ok(())
}
