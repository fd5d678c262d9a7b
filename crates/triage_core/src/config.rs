//! Core runtime configuration.
//!
//! # Responsibility
//! - Collect host-level knobs (store location, logging, backup rotation,
//!   local UTC offset).
//! - Read overrides from the process environment.
//!
//! # Invariants
//! - Every field has a usable default; an empty environment is valid.
//! - Malformed overrides are rejected, never silently ignored.
//!
//! User-facing preferences (focus timer, daily goal) are not configuration;
//! they live in the persisted `AppSettings` record.

use crate::logging::default_log_level;
use chrono::{FixedOffset, Offset, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TRIAGE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TRIAGE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TRIAGE_LOG_DIR";
pub const ENV_MAX_BACKUPS: &str = "TRIAGE_MAX_BACKUPS";
pub const ENV_UTC_OFFSET_MINUTES: &str = "TRIAGE_UTC_OFFSET_MINUTES";

const DEFAULT_DB_FILE_NAME: &str = "triage.sqlite3";
const DEFAULT_MAX_BACKUPS: usize = 7;
const DEFAULT_BACKUP_INTERVAL_MS: i64 = 24 * 60 * 60 * 1000;

/// Backup rotation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupPolicy {
    /// Generations kept after each backup, newest first.
    pub max_generations: usize,
    /// Minimum spacing between automatic backups.
    pub min_interval_ms: i64,
}

impl Default for BackupPolicy {
    fn default() -> Self {
        Self {
            max_generations: DEFAULT_MAX_BACKUPS,
            min_interval_ms: DEFAULT_BACKUP_INTERVAL_MS,
        }
    }
}

/// Host-level configuration for opening and running the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling logs; `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
    pub backup: BackupPolicy,
    /// Wall-clock offset used for completion hours and day boundaries.
    pub utc_offset: FixedOffset,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            backup: BackupPolicy::default(),
            utc_offset: Utc.fix(),
        }
    }
}

impl CoreConfig {
    /// Builds configuration from `TRIAGE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = read(ENV_MAX_BACKUPS) {
            config.backup.max_generations = match raw.parse::<usize>() {
                Ok(value) if value > 0 => value,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_MAX_BACKUPS,
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = read(ENV_UTC_OFFSET_MINUTES) {
            config.utc_offset = parse_offset_minutes(&raw).ok_or(ConfigError::InvalidValue {
                key: ENV_UTC_OFFSET_MINUTES,
                value: raw,
            })?;
        }

        Ok(config)
    }
}

/// Minutes east of UTC, strictly inside one day either way.
fn parse_offset_minutes(raw: &str) -> Option<FixedOffset> {
    let minutes = raw.parse::<i32>().ok()?;
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

/// Configuration parsing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for {key}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_LOG_DIR, ENV_MAX_BACKUPS, ENV_UTC_OFFSET_MINUTES};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.backup.max_generations, 7);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn overrides_are_trimmed_and_applied() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_LOG_DIR, " /tmp/triage "),
            (ENV_MAX_BACKUPS, "3"),
        ]))
        .unwrap();
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/triage")));
        assert_eq!(config.backup.max_generations, 3);
    }

    #[test]
    fn zero_or_garbage_backup_limit_is_rejected() {
        for raw in ["0", "many"] {
            let err = CoreConfig::from_lookup(lookup(&[(ENV_MAX_BACKUPS, raw)])).unwrap_err();
            assert_eq!(
                err,
                ConfigError::InvalidValue {
                    key: ENV_MAX_BACKUPS,
                    value: raw.to_string()
                }
            );
        }
    }

    #[test]
    fn utc_offset_is_read_in_minutes() {
        let config = CoreConfig::from_lookup(lookup(&[(ENV_UTC_OFFSET_MINUTES, "540")])).unwrap();
        assert_eq!(config.utc_offset.local_minus_utc(), 9 * 3600);

        let config = CoreConfig::from_lookup(lookup(&[(ENV_UTC_OFFSET_MINUTES, "-330")])).unwrap();
        assert_eq!(config.utc_offset.local_minus_utc(), -330 * 60);

        assert_eq!(CoreConfig::default().utc_offset.local_minus_utc(), 0);
    }

    #[test]
    fn out_of_range_utc_offset_is_rejected() {
        for raw in ["1440", "-2000", "east"] {
            let err = CoreConfig::from_lookup(lookup(&[(ENV_UTC_OFFSET_MINUTES, raw)])).unwrap_err();
            assert_eq!(
                err,
                ConfigError::InvalidValue {
                    key: ENV_UTC_OFFSET_MINUTES,
                    value: raw.to_string()
                }
            );
        }
    }
}
