//! Storage configuration
//!
//! Connection pool settings and the SQLite pragmas applied to every pooled
//! connection.

use std::path::PathBuf;
use std::time::Duration;

use super::error::{StorageError, StorageResult};

/// Largest pool the storage layer accepts.
const MAX_POOL_SIZE: u32 = 100;

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Database file path
    pub path: PathBuf,

    /// Connection pool size (default: 8)
    pub pool_size: u32,

    /// Connection timeout (default: 5s)
    pub connection_timeout: Duration,

    /// Busy timeout (default: 5000ms)
    pub busy_timeout: Duration,

    /// Enable WAL mode (default: true)
    pub enable_wal: bool,

    /// Enable foreign keys (default: true)
    pub enable_foreign_keys: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("routinely.db"),
            pool_size: 8,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_millis(5000),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

impl StorageConfig {
    /// Create a new configuration with the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Ensure all configuration values are within acceptable ranges.
    pub fn validate(&self) -> StorageResult<()> {
        if self.pool_size == 0 {
            return Err(StorageError::InvalidConfig(
                "pool_size must be greater than 0".to_string(),
            ));
        }
        if self.pool_size > MAX_POOL_SIZE {
            return Err(StorageError::InvalidConfig(format!(
                "pool_size too large (max: {MAX_POOL_SIZE})"
            )));
        }
        if self.connection_timeout.is_zero() {
            return Err(StorageError::InvalidConfig(
                "connection_timeout must be greater than 0".to_string(),
            ));
        }
        if self.path.as_os_str().is_empty() {
            return Err(StorageError::InvalidConfig("database path cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Create a builder for more complex configurations
    pub fn builder(path: impl Into<PathBuf>) -> StorageConfigBuilder {
        StorageConfigBuilder::new(path)
    }
}

/// Builder for StorageConfig with validation
#[derive(Debug)]
pub struct StorageConfigBuilder {
    config: StorageConfig,
}

impl StorageConfigBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { config: StorageConfig::new(path) }
    }

    pub fn pool_size(mut self, size: u32) -> Self {
        self.config.pool_size = size;
        self
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.config.busy_timeout = timeout;
        self
    }

    pub fn disable_wal(mut self) -> Self {
        self.config.enable_wal = false;
        self
    }

    pub fn disable_foreign_keys(mut self) -> Self {
        self.config.enable_foreign_keys = false;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> StorageResult<StorageConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
