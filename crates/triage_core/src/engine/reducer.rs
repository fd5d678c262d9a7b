//! The `apply` transition function and its per-action handlers.

use super::action::{Action, Direction};
use super::collection::TaskCollection;
use super::completion::{complete, regenerate};
use super::lanes::{
    dedupe_tags, demote_to_queued, ensure_single_active, lane_indices, max_order,
    promote_queued_if_empty, promote_to_active,
};
use crate::model::task::{EpochMs, Task, TaskStatus};
use chrono::{FixedOffset, Offset, Utc};

/// Applies one action and returns the next snapshot.
///
/// Total over well-typed input: invalid requests (blank titles, unknown ids,
/// boundary reorders, status guards that do not match) return a handle to
/// the same snapshot instead of failing. Completion hour and weekday are
/// read in UTC; see [`apply_with_offset`].
pub fn apply(collection: &TaskCollection, action: Action) -> TaskCollection {
    apply_with_offset(collection, action, Utc.fix())
}

/// Like [`apply`], deriving completion hour and weekday on the wall clock at
/// `offset` from UTC.
pub fn apply_with_offset(
    collection: &TaskCollection,
    action: Action,
    offset: FixedOffset,
) -> TaskCollection {
    match action {
        Action::Normalize { tasks, now } => normalize(tasks, now),
        Action::Add { id, title, now } => add(collection, id, &title, now),
        Action::MoveTo { id, to, now } => move_to(collection, &id, to, now, offset),
        Action::SetActive { id, now } => set_active(collection, &id, now),
        Action::CompleteActive { now } => complete_active(collection, now, offset),
        Action::Reorder { id, direction, now } => reorder(collection, &id, direction, now),
        Action::RestoreDiscarded { id, now } => {
            return_to_captured(collection, &id, TaskStatus::Discarded, now)
        }
        Action::UndoCompleted { id, now } => {
            return_to_captured(collection, &id, TaskStatus::Completed, now)
        }
        Action::SetDescription {
            id,
            description,
            now,
        } => update_task(collection, &id, now, |task| {
            task.description = description.filter(|text| !text.trim().is_empty());
            true
        }),
        Action::SetPriority { id, priority, now } => update_task(collection, &id, now, |task| {
            task.priority = priority;
            true
        }),
        Action::AddTag { id, tag, now } => update_task(collection, &id, now, |task| {
            let tag = tag.trim();
            if tag.is_empty() || task.has_tag(tag) {
                return false;
            }
            task.tags.push(tag.to_string());
            true
        }),
        Action::RemoveTag { id, tag, now } => update_task(collection, &id, now, |task| {
            let tag = tag.trim();
            if tag.is_empty() || !task.has_tag(tag) {
                return false;
            }
            task.tags.retain(|existing| existing != tag);
            true
        }),
        Action::SetEstimate { id, minutes, now } => update_task(collection, &id, now, |task| {
            task.estimated_minutes = minutes;
            true
        }),
        Action::SetLaterDue { id, due, now } => update_task(collection, &id, now, |task| {
            task.later_due_date = due;
            true
        }),
        Action::SetRecurrence {
            id,
            recurrence,
            now,
        } => update_task(collection, &id, now, |task| {
            task.recurrence = recurrence;
            true
        }),
        Action::Archive { id, now } => update_task(collection, &id, now, |task| {
            task.archived_at = Some(now);
            true
        }),
        Action::RestoreArchive { id, now } => update_task(collection, &id, now, |task| {
            task.archived_at = None;
            true
        }),
    }
}

fn normalize(mut tasks: Vec<Task>, now: EpochMs) -> TaskCollection {
    for task in &mut tasks {
        dedupe_tags(task);
    }
    ensure_single_active(&mut tasks, now, None);
    promote_queued_if_empty(&mut tasks, now);
    TaskCollection::new(tasks)
}

fn add(collection: &TaskCollection, id: String, title: &str, now: EpochMs) -> TaskCollection {
    let title = title.trim();
    if title.is_empty() || collection.get(&id).is_some() {
        return collection.clone();
    }

    let mut tasks = collection.to_vec();
    let order = max_order(&tasks, TaskStatus::Captured).saturating_add(1);
    tasks.push(Task::captured(id, title, order, now));
    TaskCollection::new(tasks)
}

fn move_to(
    collection: &TaskCollection,
    id: &str,
    to: TaskStatus,
    now: EpochMs,
    offset: FixedOffset,
) -> TaskCollection {
    let Some(index) = collection.position(id) else {
        return collection.clone();
    };

    let mut tasks = collection.to_vec();
    let order = if tasks[index].status == to {
        tasks[index].order
    } else {
        max_order(&tasks, to).saturating_add(1)
    };

    let task = &mut tasks[index];
    task.order = order;
    match to {
        TaskStatus::Active => promote_to_active(task, now),
        TaskStatus::Completed => complete(task, now, offset),
        other => {
            task.status = other;
            task.updated_at = now;
            task.done_at = None;
        }
    }

    if to == TaskStatus::Completed {
        if let Some(successor) = regenerate(&tasks[index], &tasks, now) {
            tasks.push(successor);
        }
    }

    ensure_single_active(&mut tasks, now, Some(id));
    promote_queued_if_empty(&mut tasks, now);
    TaskCollection::new(tasks)
}

fn set_active(collection: &TaskCollection, id: &str, now: EpochMs) -> TaskCollection {
    let Some(target) = collection.position(id) else {
        return collection.clone();
    };

    let mut tasks = collection.to_vec();
    let mut queued_tail = max_order(&tasks, TaskStatus::Queued);
    for (index, task) in tasks.iter_mut().enumerate() {
        if index == target {
            promote_to_active(task, now);
        } else if task.status == TaskStatus::Active {
            queued_tail = queued_tail.saturating_add(1);
            demote_to_queued(task, queued_tail, now);
        }
    }
    TaskCollection::new(tasks)
}

/// Completes the focus item at the tail of the completed lane, like
/// `MoveTo(completed)`.
fn complete_active(
    collection: &TaskCollection,
    now: EpochMs,
    offset: FixedOffset,
) -> TaskCollection {
    let Some(index) = collection
        .iter()
        .position(|task| task.status == TaskStatus::Active)
    else {
        return collection.clone();
    };

    let mut tasks = collection.to_vec();
    tasks[index].order = max_order(&tasks, TaskStatus::Completed).saturating_add(1);
    complete(&mut tasks[index], now, offset);
    if let Some(successor) = regenerate(&tasks[index], &tasks, now) {
        tasks.push(successor);
    }
    promote_queued_if_empty(&mut tasks, now);
    TaskCollection::new(tasks)
}

fn reorder(
    collection: &TaskCollection,
    id: &str,
    direction: Direction,
    now: EpochMs,
) -> TaskCollection {
    let lane = lane_indices(collection.tasks(), TaskStatus::Queued);
    let Some(position) = lane
        .iter()
        .position(|&index| collection.tasks()[index].id == id)
    else {
        return collection.clone();
    };

    let neighbour = match direction {
        Direction::Up => position.checked_sub(1),
        Direction::Down => Some(position + 1).filter(|&next| next < lane.len()),
    };
    let Some(neighbour) = neighbour else {
        return collection.clone();
    };

    let (own, other) = (lane[position], lane[neighbour]);
    let mut tasks = collection.to_vec();
    let own_order = tasks[own].order;
    tasks[own].order = tasks[other].order;
    tasks[other].order = own_order;
    tasks[own].updated_at = now;
    tasks[other].updated_at = now;
    TaskCollection::new(tasks)
}

/// Sends a task from `from` back to the captured tail; no-op on any other status.
fn return_to_captured(
    collection: &TaskCollection,
    id: &str,
    from: TaskStatus,
    now: EpochMs,
) -> TaskCollection {
    let Some(index) = collection.position(id) else {
        return collection.clone();
    };
    if collection.tasks()[index].status != from {
        return collection.clone();
    }

    let mut tasks = collection.to_vec();
    let order = max_order(&tasks, TaskStatus::Captured).saturating_add(1);
    let task = &mut tasks[index];
    task.status = TaskStatus::Captured;
    task.order = order;
    task.updated_at = now;
    task.done_at = None;
    TaskCollection::new(tasks)
}

/// Runs a field-level edit on one task and stamps `updated_at`.
///
/// `edit` reports whether it changed anything; `false` keeps the snapshot.
fn update_task<F>(collection: &TaskCollection, id: &str, now: EpochMs, edit: F) -> TaskCollection
where
    F: FnOnce(&mut Task) -> bool,
{
    let Some(index) = collection.position(id) else {
        return collection.clone();
    };

    let mut task = collection.tasks()[index].clone();
    if !edit(&mut task) {
        return collection.clone();
    }
    task.updated_at = now;

    let mut tasks = collection.to_vec();
    tasks[index] = task;
    TaskCollection::new(tasks)
}
