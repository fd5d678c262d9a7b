//! Action vocabulary accepted by the lifecycle engine.

use crate::model::task::{EpochMs, Priority, Recurrence, Task, TaskId, TaskStatus};

/// Direction for reordering inside the queued lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the lane head (smaller `order`).
    Up,
    /// Towards the lane tail (larger `order`).
    Down,
}

/// One user-triggered transition request.
///
/// Every variant carries the transition time explicitly; the engine has no
/// other notion of "now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replaces the whole collection with `tasks` after repairing invariants.
    /// Used for initial load, import, backup restore and external snapshots.
    Normalize { tasks: Vec<Task>, now: EpochMs },
    /// Captures a new task with a caller-assigned id.
    Add {
        id: TaskId,
        title: String,
        now: EpochMs,
    },
    /// Moves a task into another lane.
    MoveTo {
        id: TaskId,
        to: TaskStatus,
        now: EpochMs,
    },
    /// Makes a task the focus item, demoting the previous one.
    SetActive { id: TaskId, now: EpochMs },
    /// Completes the focus item and promotes the queue head.
    CompleteActive { now: EpochMs },
    /// Swaps a queued task with its neighbour.
    Reorder {
        id: TaskId,
        direction: Direction,
        now: EpochMs,
    },
    RestoreDiscarded { id: TaskId, now: EpochMs },
    UndoCompleted { id: TaskId, now: EpochMs },
    SetDescription {
        id: TaskId,
        description: Option<String>,
        now: EpochMs,
    },
    SetPriority {
        id: TaskId,
        priority: Priority,
        now: EpochMs,
    },
    AddTag {
        id: TaskId,
        tag: String,
        now: EpochMs,
    },
    RemoveTag {
        id: TaskId,
        tag: String,
        now: EpochMs,
    },
    SetEstimate {
        id: TaskId,
        minutes: Option<u32>,
        now: EpochMs,
    },
    SetLaterDue {
        id: TaskId,
        due: Option<EpochMs>,
        now: EpochMs,
    },
    SetRecurrence {
        id: TaskId,
        recurrence: Option<Recurrence>,
        now: EpochMs,
    },
    Archive { id: TaskId, now: EpochMs },
    RestoreArchive { id: TaskId, now: EpochMs },
}

impl Action {
    /// Stable snake_case name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normalize { .. } => "normalize",
            Self::Add { .. } => "add",
            Self::MoveTo { .. } => "move_to",
            Self::SetActive { .. } => "set_active",
            Self::CompleteActive { .. } => "complete_active",
            Self::Reorder { .. } => "reorder",
            Self::RestoreDiscarded { .. } => "restore_discarded",
            Self::UndoCompleted { .. } => "undo_completed",
            Self::SetDescription { .. } => "set_description",
            Self::SetPriority { .. } => "set_priority",
            Self::AddTag { .. } => "add_tag",
            Self::RemoveTag { .. } => "remove_tag",
            Self::SetEstimate { .. } => "set_estimate",
            Self::SetLaterDue { .. } => "set_later_due",
            Self::SetRecurrence { .. } => "set_recurrence",
            Self::Archive { .. } => "archive",
            Self::RestoreArchive { .. } => "restore_archive",
        }
    }

    /// Transition time carried by the action.
    pub fn now(&self) -> EpochMs {
        match self {
            Self::Normalize { now, .. }
            | Self::Add { now, .. }
            | Self::MoveTo { now, .. }
            | Self::SetActive { now, .. }
            | Self::CompleteActive { now }
            | Self::Reorder { now, .. }
            | Self::RestoreDiscarded { now, .. }
            | Self::UndoCompleted { now, .. }
            | Self::SetDescription { now, .. }
            | Self::SetPriority { now, .. }
            | Self::AddTag { now, .. }
            | Self::RemoveTag { now, .. }
            | Self::SetEstimate { now, .. }
            | Self::SetLaterDue { now, .. }
            | Self::SetRecurrence { now, .. }
            | Self::Archive { now, .. }
            | Self::RestoreArchive { now, .. } => *now,
        }
    }
}
