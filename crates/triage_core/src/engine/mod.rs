//! Task lifecycle engine.
//!
//! # Responsibility
//! - Turn `(collection, action)` into the next consistent collection.
//! - Own every cross-task invariant (single active task, auto-promotion,
//!   per-lane ordering, completion timing, recurrence regeneration).
//!
//! # Invariants
//! - `apply` never performs I/O, never logs and never reads a wall clock;
//!   time only enters through the `now` carried by each action, and the
//!   local offset only through `apply_with_offset`.
//! - A no-op returns a handle to the very same snapshot, so callers can skip
//!   persistence with `TaskCollection::same_snapshot`.
//! - After every action at most one task is `Active`, and when none is, no
//!   task is `Queued`.

pub mod action;
pub mod collection;
mod completion;
mod lanes;
mod reducer;

pub use action::{Action, Direction};
pub use collection::TaskCollection;
pub use reducer::{apply, apply_with_offset};
