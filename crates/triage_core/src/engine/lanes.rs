//! Lane bookkeeping and invariant repair helpers.
//!
//! All helpers work on an owned, already-copied task buffer and report
//! whether they changed anything.

use crate::model::task::{EpochMs, Task, TaskStatus};

/// Highest `order` in a lane, or 0 for an empty lane.
pub(crate) fn max_order(tasks: &[Task], status: TaskStatus) -> i64 {
    tasks
        .iter()
        .filter(|task| task.status == status)
        .map(|task| task.order)
        .max()
        .unwrap_or(0)
}

/// Indices of one lane sorted by `order`, ties in collection order.
pub(crate) fn lane_indices(tasks: &[Task], status: TaskStatus) -> Vec<usize> {
    let mut indices: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.status == status)
        .map(|(index, _)| index)
        .collect();
    indices.sort_by_key(|&index| tasks[index].order);
    indices
}

/// Demotes a task into the queued lane at `order`.
pub(crate) fn demote_to_queued(task: &mut Task, order: i64, now: EpochMs) {
    task.status = TaskStatus::Queued;
    task.order = order;
    task.updated_at = now;
    task.done_at = None;
}

/// Makes a task the focus item.
pub(crate) fn promote_to_active(task: &mut Task, now: EpochMs) {
    task.status = TaskStatus::Active;
    task.order = 0;
    task.started_at = Some(now);
    task.updated_at = now;
    task.done_at = None;
}

/// Keeps a single active task and demotes the rest to the queued tail.
///
/// The survivor is `keep` when it is active; otherwise the most recently
/// updated active task, the later one in collection order on ties.
pub(crate) fn ensure_single_active(
    tasks: &mut [Task],
    now: EpochMs,
    keep: Option<&str>,
) -> bool {
    let active: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.status == TaskStatus::Active)
        .map(|(index, _)| index)
        .collect();
    if active.len() <= 1 {
        return false;
    }

    let preferred =
        keep.and_then(|id| active.iter().copied().find(|&index| tasks[index].id == id));
    let survivor = match preferred {
        Some(index) => index,
        None => match active
            .iter()
            .copied()
            .max_by_key(|&index| tasks[index].updated_at)
        {
            Some(index) => index,
            None => return false,
        },
    };

    let mut next_order = max_order(tasks, TaskStatus::Queued);
    for index in active {
        if index == survivor {
            continue;
        }
        next_order = next_order.saturating_add(1);
        demote_to_queued(&mut tasks[index], next_order, now);
    }
    true
}

/// Promotes the queue head when the active slot is empty.
pub(crate) fn promote_queued_if_empty(tasks: &mut [Task], now: EpochMs) -> bool {
    if tasks.iter().any(|task| task.status == TaskStatus::Active) {
        return false;
    }
    match lane_indices(tasks, TaskStatus::Queued).first() {
        Some(&head) => {
            promote_to_active(&mut tasks[head], now);
            true
        }
        None => false,
    }
}

/// Removes duplicate tags, keeping the first occurrence.
pub(crate) fn dedupe_tags(task: &mut Task) -> bool {
    let before = task.tags.len();
    let mut seen = std::collections::HashSet::with_capacity(before);
    task.tags.retain(|tag| seen.insert(tag.clone()));
    task.tags.len() != before
}
