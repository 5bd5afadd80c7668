//! SQLite connection pool
//!
//! r2d2 pool whose connections all carry the configured pragmas.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info, instrument, warn};

use super::connection::SqliteConnection;
use super::pragmas::apply_connection_pragmas;
use crate::storage::config::StorageConfig;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::metrics::StorageMetrics;
use crate::storage::types::{ConnectionPool, HealthStatus, PoolMetrics};

/// Pool of SQLite connections
///
/// Pragmas (WAL, foreign keys, busy timeout) are applied in the r2d2 init
/// hook, so every connection handed out is configured identically.
#[derive(Debug)]
pub struct SqlitePool {
    pool: Pool<SqliteConnectionManager>,
    config: StorageConfig,
    metrics: Arc<StorageMetrics>,
}

impl SqlitePool {
    /// Open (creating if needed) the database file and build the pool.
    ///
    /// A test connection is acquired before returning, so a bad path or an
    /// unreadable file fails here rather than on first use.
    #[instrument(skip(config), fields(db_path = ?config.path, pool_size = config.pool_size))]
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        config.validate()?;
        info!("Creating SQLite connection pool");

        let metrics = Arc::new(StorageMetrics::new(config.pool_size));

        let init_config = config.clone();
        let manager = SqliteConnectionManager::file(&config.path).with_init(move |conn| {
            apply_connection_pragmas(conn, &init_config)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        });

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| {
                warn!("Failed to create connection pool: {}", e);
                StorageError::Connection(format!("Failed to create pool: {e}"))
            })?;

        {
            let conn = pool.get().map_err(|e| {
                warn!("Failed to get test connection: {}", e);
                StorageError::Connection(format!("Failed to get test connection: {e}"))
            })?;
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            debug!("Test connection verified");
        }

        info!("SQLite pool created with {} connections", config.pool_size);

        Ok(Self { pool, config: config.clone(), metrics })
    }

    /// Pool counters
    pub fn storage_metrics(&self) -> &Arc<StorageMetrics> {
        &self.metrics
    }

    /// Acquire a connection, recording acquisition time and failures.
    #[instrument(skip(self), fields(pool_size = self.config.pool_size))]
    pub fn get_sqlite_connection(&self) -> StorageResult<SqliteConnection> {
        let start = Instant::now();

        match self.pool.get() {
            Ok(conn) => {
                let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                self.metrics.record_connection_acquired(duration_ms);
                debug!("Connection acquired in {}ms", duration_ms);
                Ok(SqliteConnection::new(conn))
            }
            Err(e) => {
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("timed out") || err_str.contains("timeout") {
                    self.metrics.record_connection_timeout();
                    warn!("Connection timeout after {:?}", self.config.connection_timeout);
                    Err(StorageError::Timeout(self.config.connection_timeout.as_secs()))
                } else {
                    self.metrics.record_connection_error();
                    warn!("Connection error: {}", e);
                    Err(StorageError::Connection(format!("Failed to get connection: {e}")))
                }
            }
        }
    }
}

impl ConnectionPool for SqlitePool {
    fn health_check(&self) -> StorageResult<HealthStatus> {
        let state = self.pool.state();

        match self.pool.get() {
            Ok(_conn) => Ok(HealthStatus::healthy(
                state.connections as usize,
                state.idle_connections as usize,
                self.config.pool_size as usize,
            )),
            Err(e) => Ok(HealthStatus::unhealthy(format!("Pool unhealthy: {e}"))),
        }
    }

    fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            connections_acquired: self.metrics.connections_acquired.load(Ordering::Relaxed),
            connections_timeout: self.metrics.connections_timeout.load(Ordering::Relaxed),
            connections_error: self.metrics.connections_error.load(Ordering::Relaxed),
            avg_acquisition_time_ms: self.metrics.avg_connection_time_ms(),
        }
    }
}
