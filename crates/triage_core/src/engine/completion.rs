//! Completion timing derivation and recurrence regeneration.

use super::lanes::max_order;
use crate::model::task::{EpochMs, Task, TaskId, TaskStatus};
use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use uuid::Uuid;

const MS_PER_MINUTE: i64 = 60_000;

/// Marks a task completed at `now` and derives its timing fields.
///
/// Hour and weekday are read on the wall clock at `offset`. `actual_minutes`
/// is only replaced when `started_at` is known; earlier values survive
/// otherwise.
pub(crate) fn complete(task: &mut Task, now: EpochMs, offset: FixedOffset) {
    task.status = TaskStatus::Completed;
    task.updated_at = now;
    task.done_at = Some(now);
    if let Some(started_at) = task.started_at {
        task.actual_minutes = Some(elapsed_minutes(started_at, now));
    }
    match completion_clock(now, offset) {
        Some((hour, weekday)) => {
            task.completed_at_hour = Some(hour);
            task.day_of_week = Some(weekday);
        }
        None => {
            task.completed_at_hour = None;
            task.day_of_week = None;
        }
    }
}

/// Whole minutes between two instants, halves rounded up.
pub(crate) fn elapsed_minutes(started_at: EpochMs, now: EpochMs) -> i64 {
    (now - started_at + MS_PER_MINUTE / 2).div_euclid(MS_PER_MINUTE)
}

/// `(hour 0-23, weekday 0-6 from Sunday)` of an instant at a fixed offset.
pub(crate) fn completion_clock(now: EpochMs, offset: FixedOffset) -> Option<(u8, u8)> {
    let at = DateTime::from_timestamp_millis(now)?.with_timezone(&offset);
    let hour = u8::try_from(at.hour()).ok()?;
    let weekday = u8::try_from(at.weekday().num_days_from_sunday()).ok()?;
    Some((hour, weekday))
}

/// Builds the successor of a completed recurring task.
///
/// Returns `None` for non-recurring tasks. The successor lands at the tail of
/// the captured lane with every completion/timing field cleared.
pub(crate) fn regenerate(completed: &Task, tasks: &[Task], now: EpochMs) -> Option<Task> {
    let recurrence = completed.recurrence.clone()?;
    let mut successor = Task::captured(
        fresh_recurrence_id(tasks, now),
        completed.title.clone(),
        max_order(tasks, TaskStatus::Captured).saturating_add(1),
        now,
    );
    successor.description = completed.description.clone();
    successor.estimated_minutes = completed.estimated_minutes;
    successor.priority = completed.priority;
    successor.tags = completed.tags.clone();
    successor.recurrence = Some(recurrence);
    successor.later_due_date = completed.later_due_date;
    Some(successor)
}

fn fresh_recurrence_id(tasks: &[Task], now: EpochMs) -> TaskId {
    loop {
        let candidate = format!("rec_{now}_{}", Uuid::new_v4().simple());
        if !tasks.iter().any(|task| task.id == candidate) {
            return candidate;
        }
    }
}
