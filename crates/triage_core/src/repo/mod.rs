//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Keep SQL details for documents and backups inside the persistence
//!   boundary.
//! - Layer document semantics (current/legacy keys, settings) over raw
//!   key-value storage.
//!
//! # Invariants
//! - Payloads are stored and returned byte-for-byte; export relies on it.
//! - Repository APIs surface DB transport errors and document errors
//!   separately.

pub mod backup_repo;
pub mod document_store;
pub mod state_repo;

use crate::db::DbError;
use crate::persist::DocumentError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for document and backup persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Document(DocumentError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Document(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<DocumentError> for RepoError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}
