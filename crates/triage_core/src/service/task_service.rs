//! Task use-case service.
//!
//! # Responsibility
//! - Hydrate the engine from the stored document.
//! - Dispatch actions and persist every snapshot that changed.
//! - Route imports, external snapshots and backup restores through
//!   `Normalize`.
//!
//! # Invariants
//! - No-op dispatches never write to storage.
//! - Settings stored beside the tasks survive every task write.

use super::backup_service::BackupService;
use super::{ServiceError, ServiceResult};
use crate::engine::{apply, apply_with_offset, Action, TaskCollection};
use crate::model::task::{EpochMs, Task};
use crate::persist::{parse_import, AppSettings};
use crate::repo::backup_repo::BackupRepository;
use crate::repo::document_store::DocumentStore;
use crate::repo::state_repo::StateRepository;
use chrono::{FixedOffset, Offset, Utc};
use log::{debug, info, warn};

/// Owns the current snapshot and the store it is persisted to.
pub struct TaskService<R: StateRepository> {
    store: DocumentStore<R>,
    tasks: TaskCollection,
    settings: AppSettings,
    utc_offset: FixedOffset,
}

impl<R: StateRepository> TaskService<R> {
    /// Loads the stored document and normalizes it into a fresh snapshot.
    ///
    /// An empty store yields an empty collection with default settings.
    pub fn load(repo: R, now: EpochMs) -> ServiceResult<Self> {
        let mut service = Self {
            store: DocumentStore::new(repo),
            tasks: TaskCollection::empty(),
            settings: AppSettings::default(),
            utc_offset: Utc.fix(),
        };
        service.reload(now)?;
        Ok(service)
    }

    /// Re-reads storage, replacing the in-memory snapshot and settings.
    pub fn reload(&mut self, now: EpochMs) -> ServiceResult<()> {
        let (stored, settings) = match self.store.load()? {
            Some(state) => (state.tasks, state.settings),
            None => (Vec::new(), AppSettings::default()),
        };

        let hydrated = apply(
            &TaskCollection::empty(),
            Action::Normalize {
                tasks: stored.clone(),
                now,
            },
        );
        if hydrated.tasks() != stored.as_slice() {
            self.store.save_tasks(hydrated.tasks(), now)?;
            info!(
                "event=hydrate module=service status=repaired task_count={}",
                hydrated.len()
            );
        }

        debug!(
            "event=hydrate module=service status=ok task_count={}",
            hydrated.len()
        );
        self.tasks = hydrated;
        self.settings = settings;
        Ok(())
    }

    /// Sets the wall-clock offset used when dispatched actions complete
    /// tasks. Defaults to UTC.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    pub fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn store(&self) -> &DocumentStore<R> {
        &self.store
    }

    /// Applies one action; returns whether the snapshot changed.
    ///
    /// A changed snapshot is stored before it becomes current, so a storage
    /// failure leaves the previous snapshot in place.
    pub fn dispatch(&mut self, action: Action) -> ServiceResult<bool> {
        let name = action.name();
        let now = action.now();
        let next = apply_with_offset(&self.tasks, action, self.utc_offset);

        if next.same_snapshot(&self.tasks) {
            debug!("event=dispatch module=service status=noop action={name}");
            return Ok(false);
        }

        self.store.save_tasks(next.tasks(), now)?;
        debug!(
            "event=dispatch module=service status=ok action={} task_count={}",
            name,
            next.len()
        );
        self.tasks = next;
        Ok(true)
    }

    /// Validates and imports a serialized document, replacing all tasks.
    ///
    /// Stored settings are kept. Returns the imported task count.
    pub fn import_json(&mut self, json: &str, now: EpochMs) -> ServiceResult<usize> {
        let imported = parse_import(json).map_err(|err| {
            warn!(
                "event=import module=service status=error error_code=import_rejected error={}",
                err
            );
            ServiceError::ImportRejected(err)
        })?;

        self.replace_tasks(imported.tasks, now)?;
        info!(
            "event=import module=service status=ok task_count={}",
            self.tasks.len()
        );
        Ok(self.tasks.len())
    }

    /// Returns the stored document exactly as persisted.
    pub fn export_json(&self) -> ServiceResult<Option<String>> {
        Ok(self.store.export_raw()?)
    }

    /// Replaces the settings record, keeping tasks.
    pub fn update_settings(&mut self, settings: AppSettings, now: EpochMs) -> ServiceResult<()> {
        if settings == self.settings {
            return Ok(());
        }
        self.store.save_settings(settings, now)?;
        self.settings = settings;
        info!("event=settings_update module=service status=ok");
        Ok(())
    }

    /// Restores backup `id` and re-hydrates from it.
    ///
    /// Returns `false` (state untouched) when the backup does not exist.
    pub fn restore_backup<B: BackupRepository>(
        &mut self,
        backups: &BackupService<B>,
        id: &str,
        now: EpochMs,
    ) -> ServiceResult<bool> {
        if !backups.restore(id, now)? {
            return Ok(false);
        }
        self.reload(now)?;
        Ok(true)
    }

    /// Normalizes `tasks` into the current snapshot.
    ///
    /// Returns `false` without writing when the result equals the current
    /// snapshot, so echoes of this service's own writes settle immediately.
    pub(crate) fn replace_tasks(&mut self, tasks: Vec<Task>, now: EpochMs) -> ServiceResult<bool> {
        let next = apply(&self.tasks, Action::Normalize { tasks, now });
        if next == self.tasks {
            return Ok(false);
        }
        self.store.save_tasks(next.tasks(), now)?;
        self.tasks = next;
        Ok(true)
    }
}
