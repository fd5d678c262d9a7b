//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its lifecycle/value enums.
//! - Own the wire naming (camelCase fields, snake_case enum values).
//!
//! # Invariants
//! - `done_at.is_some()` if and only if `status == TaskStatus::Completed`.
//! - `priority` and `tags` are always present; missing wire values fall back
//!   to `Priority::Normal` and an empty list.
//! - `tags` never holds duplicates once normalized.

use serde::{Deserialize, Serialize};

/// Opaque task identifier assigned by the caller.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = String;

/// Unix epoch milliseconds.
pub type EpochMs = i64;

/// Life-stage of a task. Each status is its own ordering lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Freshly captured, not yet triaged.
    #[serde(alias = "inbox")]
    Captured,
    /// Parked for later, optionally with a due date.
    #[serde(alias = "later")]
    Deferred,
    /// Decided not to do; restorable.
    Discarded,
    /// The single focus item.
    #[serde(alias = "today_now")]
    Active,
    /// Staged to become active next.
    #[serde(alias = "today_next")]
    Queued,
    /// Finished.
    #[serde(alias = "done")]
    Completed,
}

impl TaskStatus {
    /// All statuses in lane display order.
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Active,
        TaskStatus::Queued,
        TaskStatus::Captured,
        TaskStatus::Deferred,
        TaskStatus::Completed,
        TaskStatus::Discarded,
    ];

    /// Returns the canonical storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Captured => "captured",
            Self::Deferred => "deferred",
            Self::Discarded => "discarded",
            Self::Active => "active",
            Self::Queued => "queued",
            Self::Completed => "completed",
        }
    }

    /// Parses canonical and legacy status names.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "captured" | "inbox" => Some(Self::Captured),
            "deferred" | "later" => Some(Self::Deferred),
            "discarded" => Some(Self::Discarded),
            "active" | "today_now" => Some(Self::Active),
            "queued" | "today_next" => Some(Self::Queued),
            "completed" | "done" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

/// Repeat cadence of a recurring task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
}

/// Recurrence rule carried by a task and copied onto its successor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub kind: RecurrenceKind,
    /// 0 (Sunday) ..= 6, used by weekly rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    /// 1 ..= 31, used by monthly rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
}

impl Recurrence {
    /// Daily rule without day constraints.
    pub fn daily() -> Self {
        Self {
            kind: RecurrenceKind::Daily,
            day_of_week: None,
            day_of_month: None,
        }
    }
}

/// Canonical task record.
///
/// Optional fields are omitted from the serialized form when unset, so a
/// document written by this crate stays readable by older writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: EpochMs,
    /// Refreshed on every mutation of this task.
    pub updated_at: EpochMs,
    /// Set exactly while `status == Completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_at: Option<EpochMs>,
    /// Position inside the status lane, lower sorts first.
    pub order: i64,
    /// Set when the task last entered `Active`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<EpochMs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
    /// Elapsed minutes of the last active session, derived on completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<i64>,
    /// Local hour of day (0-23) at completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_hour: Option<u8>,
    /// Local day of week (0 = Sunday) at completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    /// Soft-archive marker, independent of `status`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<EpochMs>,
    /// Deadline, meaningful only while `Deferred`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub later_due_date: Option<EpochMs>,
}

impl Task {
    /// Creates a captured task with default priority and no tags.
    ///
    /// The title is stored as given; trimming belongs to the add transition.
    pub fn captured(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        order: i64,
        now: EpochMs,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::Captured,
            created_at: now,
            updated_at: now,
            done_at: None,
            order,
            started_at: None,
            estimated_minutes: None,
            actual_minutes: None,
            completed_at_hour: None,
            day_of_week: None,
            priority: Priority::Normal,
            tags: Vec::new(),
            recurrence: None,
            archived_at: None,
            later_due_date: None,
        }
    }

    /// Returns whether the task carries an archive marker.
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Returns whether the task holds `tag` (exact match).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|existing| existing == tag)
    }
}
