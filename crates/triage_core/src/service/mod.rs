//! Core use-case services.
//!
//! # Responsibility
//! - Tie the pure lifecycle engine to durable storage.
//! - Keep host layers (CLI, sync adapters) decoupled from SQL and JSON.
//!
//! # Invariants
//! - The in-memory snapshot only advances after its document is stored.
//! - Rejected imports never touch memory or storage.

pub mod backup_service;
pub mod task_service;

use crate::persist::DocumentError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use-case level error.
#[derive(Debug)]
pub enum ServiceError {
    /// Storage failed; the snapshot was not advanced.
    Repo(RepoError),
    /// An imported or externally supplied document failed validation.
    ImportRejected(DocumentError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::ImportRejected(err) => write!(f, "import rejected: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::ImportRejected(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
