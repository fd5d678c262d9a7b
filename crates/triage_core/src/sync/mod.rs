//! Cross-process change ingestion.
//!
//! # Responsibility
//! - Accept "document changed elsewhere" notifications for the shared store.
//! - Feed foreign snapshots back through the import path.
//!
//! # Invariants
//! - Only changes to the current document key with a non-empty value are
//!   considered.
//! - A malformed foreign snapshot is reported and dropped; it never replaces
//!   local state.

pub mod store_change;

pub use store_change::{ingest_store_change, StoreChange, StorePoller, SyncOutcome};
