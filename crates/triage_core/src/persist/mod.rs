//! Serialized application document.
//!
//! # Responsibility
//! - Define the versioned JSON document (`tasks` + `settings`) written to the
//!   durable store and used verbatim for export.
//! - Validate imported documents and upgrade legacy versions before they
//!   reach the engine.
//!
//! # Invariants
//! - Only the current document version is ever written.
//! - Import rejects malformed input as a whole; nothing is partially applied.

pub mod document;
pub mod settings;

pub use document::{
    decode_stored, encode_document, parse_import, upgrade_legacy, DocumentError, PersistedState,
    CURRENT_DOCUMENT_VERSION, LEGACY_DOCUMENT_VERSION,
};
pub use settings::AppSettings;
