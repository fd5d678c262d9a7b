//! Core domain logic for task triage.
//! This crate is the single source of truth for lifecycle invariants.

pub mod config;
pub mod db;
pub mod engine;
pub mod insights;
pub mod logging;
pub mod model;
pub mod persist;
pub mod repo;
pub mod service;
pub mod sync;

pub use config::{BackupPolicy, ConfigError, CoreConfig};
pub use engine::{apply, apply_with_offset, Action, Direction, TaskCollection};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::task::{
    EpochMs, Priority, Recurrence, RecurrenceKind, Task, TaskId, TaskStatus,
};
pub use persist::{AppSettings, DocumentError, PersistedState};
pub use repo::backup_repo::{BackupEntry, BackupRepository, SqliteBackupRepository};
pub use repo::state_repo::{SqliteStateRepository, StateRepository};
pub use repo::{RepoError, RepoResult};
pub use service::backup_service::BackupService;
pub use service::task_service::TaskService;
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
