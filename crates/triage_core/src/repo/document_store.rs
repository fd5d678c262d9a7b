//! Document-level persistence over a raw state repository.
//!
//! # Responsibility
//! - Load the current document, upgrading the legacy one when only it exists.
//! - Save task lists without losing the settings stored beside them.
//!
//! # Invariants
//! - Writes always produce a current-version document under `DOCUMENT_KEY`.
//! - A legacy upgrade writes the current document and leaves the legacy key
//!   untouched.
//! - Unreadable stored documents are treated as absent, never as fatal.

use super::state_repo::{StateRepository, DOCUMENT_KEY, LEGACY_DOCUMENT_KEY};
use super::RepoResult;
use crate::model::task::{EpochMs, Task};
use crate::persist::{
    decode_stored, encode_document, upgrade_legacy, AppSettings, PersistedState,
    CURRENT_DOCUMENT_VERSION, LEGACY_DOCUMENT_VERSION,
};
use log::{info, warn};

/// Document store facade over one `StateRepository`.
pub struct DocumentStore<R: StateRepository> {
    repo: R,
}

impl<R: StateRepository> DocumentStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the underlying raw repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Loads the stored document, or `None` when nothing usable is stored.
    pub fn load(&self) -> RepoResult<Option<PersistedState>> {
        if let Some(state) = self.read_version(DOCUMENT_KEY, CURRENT_DOCUMENT_VERSION)? {
            return Ok(Some(state));
        }

        let Some(legacy) = self.read_version(LEGACY_DOCUMENT_KEY, LEGACY_DOCUMENT_VERSION)? else {
            return Ok(None);
        };
        let upgraded = upgrade_legacy(legacy);
        self.repo.write_document(
            DOCUMENT_KEY,
            &encode_document(&upgraded)?,
            upgraded.updated_at,
        )?;
        info!(
            "event=document_upgrade module=repo status=ok from_version={} to_version={} task_count={}",
            LEGACY_DOCUMENT_VERSION,
            CURRENT_DOCUMENT_VERSION,
            upgraded.tasks.len()
        );
        Ok(Some(upgraded))
    }

    /// Writes `tasks` as the current document, keeping stored settings.
    pub fn save_tasks(&self, tasks: &[Task], now: EpochMs) -> RepoResult<()> {
        let settings = self.load_settings()?;
        self.write(PersistedState::current(tasks.to_vec(), settings, now))
    }

    /// Returns stored settings, or defaults when none are stored.
    pub fn load_settings(&self) -> RepoResult<AppSettings> {
        Ok(self
            .read_version(DOCUMENT_KEY, CURRENT_DOCUMENT_VERSION)?
            .map(|state| state.settings)
            .unwrap_or_default())
    }

    /// Replaces stored settings, keeping the stored task list.
    pub fn save_settings(&self, settings: AppSettings, now: EpochMs) -> RepoResult<()> {
        let tasks = self
            .read_version(DOCUMENT_KEY, CURRENT_DOCUMENT_VERSION)?
            .map(|state| state.tasks)
            .unwrap_or_default();
        self.write(PersistedState::current(tasks, settings, now))
    }

    /// Returns the stored document bytes verbatim, preferring the current key.
    pub fn export_raw(&self) -> RepoResult<Option<String>> {
        match self.repo.read_document(DOCUMENT_KEY)? {
            Some(raw) => Ok(Some(raw)),
            None => self.repo.read_document(LEGACY_DOCUMENT_KEY),
        }
    }

    /// Overwrites the current document with an already-serialized payload.
    pub fn replace_raw(&self, payload: &str, now: EpochMs) -> RepoResult<()> {
        self.repo.write_document(DOCUMENT_KEY, payload, now)
    }

    /// Removes both current and legacy documents.
    pub fn clear(&self) -> RepoResult<()> {
        self.repo.delete_document(DOCUMENT_KEY)?;
        self.repo.delete_document(LEGACY_DOCUMENT_KEY)
    }

    fn write(&self, state: PersistedState) -> RepoResult<()> {
        let payload = encode_document(&state)?;
        self.repo
            .write_document(DOCUMENT_KEY, &payload, state.updated_at)
    }

    fn read_version(&self, key: &str, version: u64) -> RepoResult<Option<PersistedState>> {
        let Some(raw) = self.repo.read_document(key)? else {
            return Ok(None);
        };
        match decode_stored(&raw, version) {
            Ok(state) => Ok(state),
            Err(err) => {
                warn!(
                    "event=document_read module=repo status=error key={} error={}",
                    key, err
                );
                Ok(None)
            }
        }
    }
}
