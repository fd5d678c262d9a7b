//! Versioned document codec, legacy upgrade and import validation.
//!
//! Two read paths exist on purpose:
//! - `decode_stored` is lenient: only entries without a string `id`/`title`
//!   are skipped. Any other unreadable field is coerced or reset to its
//!   default, so a stored task is never lost on the next write.
//! - `parse_import` is strict: any malformed entry rejects the whole file.

use super::settings::AppSettings;
use crate::model::task::{EpochMs, Recurrence, Task, TaskStatus};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Version written by this crate.
pub const CURRENT_DOCUMENT_VERSION: u64 = 2;
/// Oldest version still upgraded on read (tasks only, no settings).
pub const LEGACY_DOCUMENT_VERSION: u64 = 1;

const PRIORITY_VALUES: &[&str] = &["high", "normal", "low"];

/// Full persisted application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u64,
    /// Write time of the document, epoch milliseconds.
    pub updated_at: EpochMs,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub settings: AppSettings,
}

impl PersistedState {
    /// Builds a current-version document.
    pub fn current(tasks: Vec<Task>, settings: AppSettings, now: EpochMs) -> Self {
        Self {
            version: CURRENT_DOCUMENT_VERSION,
            updated_at: now,
            tasks,
            settings,
        }
    }
}

/// Error for document decoding and import validation.
#[derive(Debug)]
pub enum DocumentError {
    /// Input is not valid JSON, or a document cannot be encoded.
    Json(serde_json::Error),
    /// Top-level value is not a JSON object.
    NotAnObject,
    /// `version` is missing or not a supported number.
    UnsupportedVersion(String),
    /// A required top-level field is missing or has the wrong type.
    InvalidField(&'static str),
    /// One task entry is malformed.
    InvalidTask { index: usize, reason: String },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid document json: {err}"),
            Self::NotAnObject => write!(f, "document must be a json object"),
            Self::UnsupportedVersion(value) => {
                write!(f, "unsupported document version `{value}`")
            }
            Self::InvalidField(field) => {
                write!(f, "document field `{field}` is missing or invalid")
            }
            Self::InvalidTask { index, reason } => {
                write!(f, "invalid task at index {index}: {reason}")
            }
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Serializes a document for storage or export.
pub fn encode_document(state: &PersistedState) -> Result<String, DocumentError> {
    Ok(serde_json::to_string(state)?)
}

/// Decodes a stored document of exactly `expected_version`.
///
/// Returns `Ok(None)` when the payload is valid JSON but not a document of
/// that version, so callers can fall back to another key.
pub fn decode_stored(
    raw: &str,
    expected_version: u64,
) -> Result<Option<PersistedState>, DocumentError> {
    let value: Value = serde_json::from_str(raw)?;
    if value.get("version").and_then(Value::as_u64) != Some(expected_version) {
        return Ok(None);
    }
    let Some(entries) = value.get("tasks").and_then(Value::as_array) else {
        return Ok(None);
    };

    let tasks = entries.iter().filter_map(decode_stored_entry).collect();

    Ok(Some(PersistedState {
        version: expected_version,
        updated_at: value.get("updatedAt").and_then(Value::as_i64).unwrap_or(0),
        tasks,
        settings: read_settings(value.get("settings")),
    }))
}

/// Upgrades a legacy document to the current version.
///
/// Tasks already carry default priority/tags after decoding; the upgrade adds
/// default settings and bumps the version.
pub fn upgrade_legacy(state: PersistedState) -> PersistedState {
    if state.version >= CURRENT_DOCUMENT_VERSION {
        return state;
    }
    PersistedState {
        version: CURRENT_DOCUMENT_VERSION,
        updated_at: state.updated_at,
        tasks: state.tasks,
        settings: AppSettings::default(),
    }
}

/// Validates and decodes an imported document, upgrading legacy versions.
pub fn parse_import(json: &str) -> Result<PersistedState, DocumentError> {
    let value: Value = serde_json::from_str(json)?;
    let version = validate_import_shape(&value)?;

    let entries = value
        .get("tasks")
        .and_then(Value::as_array)
        .ok_or(DocumentError::InvalidField("tasks"))?;
    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let task =
            migrate_task(entry).map_err(|reason| DocumentError::InvalidTask { index, reason })?;
        tasks.push(task);
    }

    let state = PersistedState {
        version,
        updated_at: value.get("updatedAt").and_then(Value::as_i64).unwrap_or(0),
        tasks,
        settings: if version == LEGACY_DOCUMENT_VERSION {
            AppSettings::default()
        } else {
            read_settings(value.get("settings"))
        },
    };
    Ok(upgrade_legacy(state))
}

/// Checks the primitive shape required before import and returns the version.
fn validate_import_shape(value: &Value) -> Result<u64, DocumentError> {
    let object = value.as_object().ok_or(DocumentError::NotAnObject)?;

    let version = match object.get("version") {
        Some(raw) => match raw.as_u64() {
            Some(v) if v == LEGACY_DOCUMENT_VERSION || v == CURRENT_DOCUMENT_VERSION => v,
            _ => return Err(DocumentError::UnsupportedVersion(raw.to_string())),
        },
        None => return Err(DocumentError::UnsupportedVersion("missing".to_string())),
    };

    if !object.get("updatedAt").is_some_and(Value::is_number) {
        return Err(DocumentError::InvalidField("updatedAt"));
    }
    let entries = object
        .get("tasks")
        .and_then(Value::as_array)
        .ok_or(DocumentError::InvalidField("tasks"))?;

    for (index, entry) in entries.iter().enumerate() {
        let Some(task) = entry.as_object() else {
            return Err(DocumentError::InvalidTask {
                index,
                reason: "entry is not an object".to_string(),
            });
        };
        for field in ["id", "title", "status"] {
            if !task.get(field).is_some_and(Value::is_string) {
                return Err(invalid_field(index, field, "string"));
            }
        }
        for field in ["createdAt", "updatedAt", "order"] {
            if !task.get(field).is_some_and(Value::is_number) {
                return Err(invalid_field(index, field, "number"));
            }
        }
    }

    Ok(version)
}

fn invalid_field(index: usize, field: &str, expected: &str) -> DocumentError {
    DocumentError::InvalidTask {
        index,
        reason: format!("`{field}` must be a {expected}"),
    }
}

/// Decodes one stored entry, repairing everything but its identity.
///
/// Returns `None` only when `id` or `title` is not a string.
fn decode_stored_entry(entry: &Value) -> Option<Task> {
    let object = entry.as_object()?;
    let id = object.get("id")?.as_str()?;
    let title = object.get("title")?.as_str()?;

    let mut repaired = object.clone();
    repair_stored_fields(&mut repaired);
    match migrate_task(&Value::Object(repaired)) {
        Ok(task) => Some(task),
        Err(reason) => {
            warn!(
                "event=document_decode module=persist status=repaired task_id={} error={}",
                id, reason
            );
            Some(Task::captured(id, title, 0, 0))
        }
    }
}

/// Coerces fractional numbers, resets required fields and drops optional
/// fields whose values are out of range.
fn repair_stored_fields(object: &mut Map<String, Value>) {
    let status_ok = object
        .get("status")
        .is_some_and(|value| serde_json::from_value::<TaskStatus>(value.clone()).is_ok());
    if !status_ok {
        object.insert("status".to_string(), Value::from(TaskStatus::Captured.as_str()));
    }

    let created_at = object.get("createdAt").and_then(coerce_integer).unwrap_or(0);
    let updated_at = object
        .get("updatedAt")
        .and_then(coerce_integer)
        .unwrap_or(created_at);
    let order = object.get("order").and_then(coerce_integer).unwrap_or(0);
    object.insert("createdAt".to_string(), Value::from(created_at));
    object.insert("updatedAt".to_string(), Value::from(updated_at));
    object.insert("order".to_string(), Value::from(order));

    if object.get("description").is_some_and(|value| !value.is_string()) {
        object.remove("description");
    }

    let bounded: [(&str, i64, i64); 8] = [
        ("doneAt", i64::MIN, i64::MAX),
        ("startedAt", i64::MIN, i64::MAX),
        ("archivedAt", i64::MIN, i64::MAX),
        ("laterDueDate", i64::MIN, i64::MAX),
        ("actualMinutes", i64::MIN, i64::MAX),
        ("estimatedMinutes", 0, i64::from(u32::MAX)),
        ("completedAtHour", 0, 23),
        ("dayOfWeek", 0, 6),
    ];
    for (field, min, max) in bounded {
        let Some(value) = object.get(field) else {
            continue;
        };
        match coerce_integer(value).filter(|number| (min..=max).contains(number)) {
            Some(number) => {
                object.insert(field.to_string(), Value::from(number));
            }
            None => {
                object.remove(field);
            }
        }
    }
}

/// Integer value of a JSON number; finite fractions round to the nearest.
fn coerce_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|number| number.is_finite())
            .map(|number| number.round() as i64)
    })
}

/// Brings one task entry to the current shape.
///
/// Optional fields with unusable values are dropped so they fall back to their
/// defaults; unknown fields are ignored by the decoder.
fn migrate_task(entry: &Value) -> Result<Task, String> {
    let mut object: Map<String, Value> = entry
        .as_object()
        .cloned()
        .ok_or_else(|| "entry is not an object".to_string())?;

    let string_tags: Option<Vec<Value>> = object.get("tags").and_then(Value::as_array).map(|tags| {
        tags.iter()
            .filter(|tag| tag.is_string())
            .cloned()
            .collect()
    });
    match string_tags {
        Some(kept) => {
            object.insert("tags".to_string(), Value::Array(kept));
        }
        None => {
            object.remove("tags");
        }
    }

    let priority_ok = object
        .get("priority")
        .and_then(Value::as_str)
        .is_some_and(|value| PRIORITY_VALUES.contains(&value));
    if !priority_ok {
        object.remove("priority");
    }

    if object
        .get("recurrence")
        .is_some_and(|value| serde_json::from_value::<Recurrence>(value.clone()).is_err())
    {
        object.remove("recurrence");
    }

    serde_json::from_value(Value::Object(object)).map_err(|err| err.to_string())
}

fn read_settings(value: Option<&Value>) -> AppSettings {
    value
        .and_then(|raw| serde_json::from_value(raw.clone()).ok())
        .unwrap_or_default()
}
