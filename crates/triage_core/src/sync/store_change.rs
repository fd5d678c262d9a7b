//! Store change events and their ingestion.

use crate::model::task::EpochMs;
use crate::persist::parse_import;
use crate::repo::state_repo::{StateRepository, DOCUMENT_KEY};
use crate::repo::RepoResult;
use crate::service::task_service::TaskService;
use crate::service::ServiceResult;
use log::{debug, info, warn};

/// One observed write to the shared store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
    /// New payload; `None` when the key was removed.
    pub new_value: Option<String>,
}

/// Result of ingesting one `StoreChange`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Other key, removal or empty payload.
    Ignored,
    /// Payload normalized to the snapshot already held.
    Unchanged,
    Applied { task_count: usize },
    /// Payload failed validation; local state kept.
    Rejected(String),
}

/// Applies a foreign snapshot to `service` when it targets the current
/// document.
///
/// Storage failures are returned as errors; invalid payloads are not.
pub fn ingest_store_change<R: StateRepository>(
    service: &mut TaskService<R>,
    change: &StoreChange,
    now: EpochMs,
) -> ServiceResult<SyncOutcome> {
    if change.key != DOCUMENT_KEY {
        return Ok(SyncOutcome::Ignored);
    }
    let Some(payload) = change.new_value.as_deref().filter(|value| !value.is_empty()) else {
        return Ok(SyncOutcome::Ignored);
    };

    let state = match parse_import(payload) {
        Ok(state) => state,
        Err(err) => {
            warn!(
                "event=sync_ingest module=sync status=error error_code=invalid_snapshot error={}",
                err
            );
            return Ok(SyncOutcome::Rejected(err.to_string()));
        }
    };

    if !service.replace_tasks(state.tasks, now)? {
        debug!("event=sync_ingest module=sync status=unchanged");
        return Ok(SyncOutcome::Unchanged);
    }

    let task_count = service.tasks().len();
    info!("event=sync_ingest module=sync status=ok task_count={task_count}");
    Ok(SyncOutcome::Applied { task_count })
}

/// Detects writes to the current document by comparing its stored write
/// time between polls.
#[derive(Debug, Default)]
pub struct StorePoller {
    last_seen: Option<EpochMs>,
}

impl StorePoller {
    /// Starts from the document's current write time so existing data is not
    /// reported as a change.
    pub fn new<R: StateRepository>(repo: &R) -> RepoResult<Self> {
        Ok(Self {
            last_seen: repo.document_updated_at(DOCUMENT_KEY)?,
        })
    }

    /// Returns a change when the document's write time moved since the last
    /// poll.
    pub fn poll<R: StateRepository>(&mut self, repo: &R) -> RepoResult<Option<StoreChange>> {
        let stamp = repo.document_updated_at(DOCUMENT_KEY)?;
        if stamp == self.last_seen {
            return Ok(None);
        }
        self.last_seen = stamp;
        Ok(Some(StoreChange {
            key: DOCUMENT_KEY.to_string(),
            new_value: repo.read_document(DOCUMENT_KEY)?,
        }))
    }
}
