//! Rotating snapshot backups of the current document.
//!
//! # Invariants
//! - A backup stores the current document payload verbatim.
//! - After every backup at most `keep` generations remain, newest kept.
//! - Restoring overwrites the current document; it never merges.

use super::state_repo::DOCUMENT_KEY;
use super::RepoResult;
use crate::model::task::EpochMs;
use rusqlite::{params, Connection, OptionalExtension};

const LAST_BACKUP_META_KEY: &str = "last_backup_at";

/// One stored backup generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    /// `backup_<created_at>`.
    pub id: String,
    pub created_at: EpochMs,
    /// Serialized document as it was stored at backup time.
    pub data: String,
}

/// Backup storage contract.
pub trait BackupRepository {
    /// Copies the current document into a new generation and prunes old ones.
    ///
    /// Returns `None` when there is no current document to back up.
    fn create_backup(&self, now: EpochMs, keep: usize) -> RepoResult<Option<String>>;
    /// Lists generations, newest first.
    fn list_backups(&self) -> RepoResult<Vec<BackupEntry>>;
    /// Overwrites the current document from one generation.
    ///
    /// Returns `false` when `id` does not exist.
    fn restore_backup(&self, id: &str, now: EpochMs) -> RepoResult<bool>;
    /// Time of the last successful backup.
    fn last_backup_time(&self) -> RepoResult<Option<EpochMs>>;
}

/// SQLite-backed backup repository sharing the document store connection.
pub struct SqliteBackupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBackupRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BackupRepository for SqliteBackupRepository<'_> {
    fn create_backup(&self, now: EpochMs, keep: usize) -> RepoResult<Option<String>> {
        let tx = self.conn.unchecked_transaction()?;
        let payload = tx
            .query_row(
                "SELECT payload FROM documents WHERE key = ?1;",
                [DOCUMENT_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        let Some(payload) = payload else {
            return Ok(None);
        };

        let id = format!("backup_{now}");
        tx.execute(
            "INSERT OR REPLACE INTO backups (id, created_at, payload) VALUES (?1, ?2, ?3);",
            params![id, now, payload],
        )?;
        tx.execute(
            "INSERT INTO store_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![LAST_BACKUP_META_KEY, now.to_string()],
        )?;
        let keep = i64::try_from(keep).unwrap_or(i64::MAX);
        tx.execute(
            "DELETE FROM backups
             WHERE id NOT IN (
                SELECT id FROM backups ORDER BY created_at DESC, id DESC LIMIT ?1
             );",
            [keep],
        )?;
        tx.commit()?;

        Ok(Some(id))
    }

    fn list_backups(&self) -> RepoResult<Vec<BackupEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, created_at, payload
             FROM backups
             ORDER BY created_at DESC, id DESC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(BackupEntry {
                id: row.get("id")?,
                created_at: row.get("created_at")?,
                data: row.get("payload")?,
            });
        }
        Ok(entries)
    }

    fn restore_backup(&self, id: &str, now: EpochMs) -> RepoResult<bool> {
        let payload = self
            .conn
            .query_row("SELECT payload FROM backups WHERE id = ?1;", [id], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        let Some(payload) = payload else {
            return Ok(false);
        };

        self.conn.execute(
            "INSERT INTO documents (key, payload, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![DOCUMENT_KEY, payload, now],
        )?;
        Ok(true)
    }

    fn last_backup_time(&self) -> RepoResult<Option<EpochMs>> {
        let raw = self
            .conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = ?1;",
                [LAST_BACKUP_META_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match raw {
            Some(value) => value.parse::<EpochMs>().map(Some).map_err(|_| {
                super::RepoError::InvalidData(format!(
                    "invalid {LAST_BACKUP_META_KEY} value `{value}` in store_meta"
                ))
            }),
            None => Ok(None),
        }
    }
}
