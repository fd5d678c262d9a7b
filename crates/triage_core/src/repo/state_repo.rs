//! Raw document storage keyed by name.

use super::RepoResult;
use crate::model::task::EpochMs;
use rusqlite::{params, Connection, OptionalExtension};

/// Store key of the current document version.
pub const DOCUMENT_KEY: &str = "triage_state_v2";
/// Store key of the legacy document, kept for rollback after upgrade.
pub const LEGACY_DOCUMENT_KEY: &str = "triage_state_v1";

/// Key-value contract for serialized documents.
pub trait StateRepository {
    /// Returns the stored payload for `key`, verbatim.
    fn read_document(&self, key: &str) -> RepoResult<Option<String>>;
    /// Inserts or replaces the payload for `key`.
    fn write_document(&self, key: &str, payload: &str, now: EpochMs) -> RepoResult<()>;
    /// Removes `key`; missing keys are not an error.
    fn delete_document(&self, key: &str) -> RepoResult<()>;
    /// Returns the write time recorded with `key`, without reading the payload.
    fn document_updated_at(&self, key: &str) -> RepoResult<Option<EpochMs>>;
}

/// SQLite-backed document repository.
pub struct SqliteStateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateRepository<'conn> {
    /// Wraps a connection returned by `db::open_db*` (migrations applied).
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StateRepository for SqliteStateRepository<'_> {
    fn read_document(&self, key: &str) -> RepoResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM documents WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn write_document(&self, key: &str, payload: &str, now: EpochMs) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO documents (key, payload, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![key, payload, now],
        )?;
        Ok(())
    }

    fn delete_document(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM documents WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn document_updated_at(&self, key: &str) -> RepoResult<Option<EpochMs>> {
        let updated_at = self
            .conn
            .query_row(
                "SELECT updated_at FROM documents WHERE key = ?1;",
                [key],
                |row| row.get::<_, EpochMs>(0),
            )
            .optional()?;
        Ok(updated_at)
    }
}
