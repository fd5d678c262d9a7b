//! Backup scheduling on top of a backup repository.

use crate::config::BackupPolicy;
use crate::model::task::EpochMs;
use crate::repo::backup_repo::{BackupEntry, BackupRepository};
use crate::repo::RepoResult;
use log::{debug, info, warn};

/// Applies a `BackupPolicy` to one `BackupRepository`.
pub struct BackupService<B: BackupRepository> {
    repo: B,
    policy: BackupPolicy,
}

impl<B: BackupRepository> BackupService<B> {
    pub fn new(repo: B, policy: BackupPolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> BackupPolicy {
        self.policy
    }

    /// Backs up the current document now, pruning to the policy's limit.
    ///
    /// Returns the new backup id, or `None` when nothing is stored yet.
    pub fn create_backup(&self, now: EpochMs) -> RepoResult<Option<String>> {
        let created = self.repo.create_backup(now, self.policy.max_generations)?;
        match &created {
            Some(id) => info!(
                "event=backup_create module=service status=ok backup_id={} keep={}",
                id, self.policy.max_generations
            ),
            None => debug!("event=backup_create module=service status=skipped reason=no_document"),
        }
        Ok(created)
    }

    /// Backs up only when the previous backup is at least one interval old.
    pub fn auto_backup_if_needed(&self, now: EpochMs) -> RepoResult<Option<String>> {
        if let Some(last) = self.repo.last_backup_time()? {
            if now - last < self.policy.min_interval_ms {
                debug!(
                    "event=backup_auto module=service status=skipped last_backup_at={}",
                    last
                );
                return Ok(None);
            }
        }
        self.create_backup(now)
    }

    /// Lists stored generations, newest first.
    pub fn list_backups(&self) -> RepoResult<Vec<BackupEntry>> {
        self.repo.list_backups()
    }

    /// Overwrites the current document from backup `id`.
    ///
    /// Callers holding a loaded snapshot should go through
    /// `TaskService::restore_backup`, which also re-hydrates.
    pub fn restore(&self, id: &str, now: EpochMs) -> RepoResult<bool> {
        let restored = self.repo.restore_backup(id, now)?;
        if restored {
            info!("event=backup_restore module=service status=ok backup_id={id}");
        } else {
            warn!(
                "event=backup_restore module=service status=error error_code=backup_not_found backup_id={}",
                id
            );
        }
        Ok(restored)
    }
}
