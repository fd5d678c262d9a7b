//! Immutable, cheaply shared task snapshots.

use crate::model::task::{Task, TaskStatus};
use std::sync::Arc;

/// One immutable snapshot of every task.
///
/// Cloning shares the underlying buffer. Two handles are the "same
/// reference" in the engine's no-op contract exactly when
/// [`TaskCollection::same_snapshot`] returns `true`.
#[derive(Debug, Clone, Default)]
pub struct TaskCollection {
    tasks: Arc<Vec<Task>>,
}

impl TaskCollection {
    /// Wraps `tasks` as-is. Invariants are not checked here; route external
    /// lists through `Action::Normalize`.
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::new(tasks),
        }
    }

    /// Returns an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns whether both handles point at the same snapshot.
    pub fn same_snapshot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tasks, &other.tasks)
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Looks up one task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Returns the focus task, if any.
    pub fn active(&self) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|task| task.status == TaskStatus::Active)
    }

    /// Returns one lane sorted by `order`; ties keep collection order.
    pub fn lane(&self, status: TaskStatus) -> Vec<&Task> {
        let mut lane: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.status == status)
            .collect();
        lane.sort_by_key(|task| task.order);
        lane
    }

    /// Counts tasks in one lane.
    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.status == status)
            .count()
    }

    /// Copies the snapshot out for mutation or serialization.
    pub fn to_vec(&self) -> Vec<Task> {
        self.tasks.as_ref().clone()
    }
}

impl PartialEq for TaskCollection {
    fn eq(&self, other: &Self) -> bool {
        self.same_snapshot(other) || self.tasks == other.tasks
    }
}

impl Eq for TaskCollection {}

impl From<Vec<Task>> for TaskCollection {
    fn from(value: Vec<Task>) -> Self {
        Self::new(value)
    }
}

impl<'a> IntoIterator for &'a TaskCollection {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
