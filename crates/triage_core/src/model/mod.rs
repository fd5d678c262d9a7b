//! Domain model for triaged tasks.
//!
//! # Responsibility
//! - Define the canonical task record shared by the engine, storage and sync.
//! - Keep one serialized shape for both persistence and export/import.
//!
//! # Invariants
//! - Every task is identified by a caller-assigned, stable `TaskId`.
//! - Removal is modelled as status/flag changes, never physical deletion.

pub mod task;
