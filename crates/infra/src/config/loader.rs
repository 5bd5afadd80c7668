//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Environment variables, when `ROUTINELY_DB_PATH` is set
//! 2. Otherwise the first config file found by [`probe_config_paths`]
//! 3. Otherwise built-in defaults
//!
//! ## Environment Variables
//! - `ROUTINELY_DB_PATH`: Database file path (required for env loading)
//! - `ROUTINELY_DB_POOL_SIZE`: Connection pool size
//! - `ROUTINELY_DB_BUSY_TIMEOUT_MS`: SQLite busy timeout in milliseconds
//! - `ROUTINELY_LOG_LEVEL`: Default log filter when `RUST_LOG` is unset
//! - `ROUTINELY_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes `routinely.{toml,json}` then `config.{toml,json}` in the
//! working directory, its parent, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use routinely_domain::{Config, DatabaseConfig, LoggingConfig, Result, RoutinelyError};

const FILE_NAMES: [&str; 4] = ["routinely.toml", "routinely.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy.
///
/// # Errors
/// Returns `RoutinelyError::Config` when a variable or file is present but
/// malformed. A missing file is not an error; defaults are used instead.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Environment incomplete, trying config file");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path)),
                None => {
                    tracing::info!("No config file found, using defaults");
                    Ok(Config::default())
                }
            }
        }
    }
}

/// Load configuration from environment variables.
///
/// Only `ROUTINELY_DB_PATH` is required; every other variable falls back to
/// its default.
///
/// # Errors
/// Returns `RoutinelyError::Config` if the path is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = DatabaseConfig::default();
    let path = env_var("ROUTINELY_DB_PATH")?;
    let pool_size = env_parse("ROUTINELY_DB_POOL_SIZE", defaults.pool_size)?;
    let busy_timeout_ms = env_parse("ROUTINELY_DB_BUSY_TIMEOUT_MS", defaults.busy_timeout_ms)?;

    let log_defaults = LoggingConfig::default();
    let level = std::env::var("ROUTINELY_LOG_LEVEL").unwrap_or(log_defaults.level);
    let json = env_bool("ROUTINELY_LOG_JSON", log_defaults.json);

    Ok(Config {
        database: DatabaseConfig { path, pool_size, busy_timeout_ms },
        logging: LoggingConfig { level, json },
    })
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations. Format is picked by
/// extension.
///
/// # Errors
/// Returns `RoutinelyError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RoutinelyError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RoutinelyError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RoutinelyError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RoutinelyError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RoutinelyError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(RoutinelyError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join(".."));
        dirs.insert(0, cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        RoutinelyError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| RoutinelyError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
