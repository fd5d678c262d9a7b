//! Read-side summaries over a task collection.
//!
//! # Responsibility
//! - Derive completion habits (weekday × time-of-day grid, last seven days).
//! - Track progress against the daily completion goal.
//! - Surface captured/deferred tasks that have been waiting too long.
//! - Answer history, archive and tag views without touching the engine.
//!
//! # Invariants
//! - Functions are pure; the caller supplies `now` and its UTC offset.
//! - Day boundaries are local midnights at that offset, matching the
//!   completion hour stored by `apply_with_offset`.

use crate::engine::{Action, TaskCollection};
use crate::model::task::{EpochMs, Task, TaskId, TaskStatus};
use crate::persist::AppSettings;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use std::cmp::Reverse;
use std::collections::BTreeSet;

const DAY_MS: i64 = 86_400_000;
const CAPTURED_STALE_DAYS: i64 = 30;
const DEFERRED_STALE_DAYS: i64 = 60;
const GOAL_WINDOW_DAYS: i64 = 7;
const HISTORY_WINDOW_DAYS: i64 = 7;

/// Days an archived task stays listed by default.
pub const ARCHIVE_DISPLAY_DAYS: i64 = 30;

/// Coarse time-of-day bucket for completion hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DaySlot {
    /// 05:00-11:59
    Morning,
    /// 12:00-16:59
    Afternoon,
    /// 17:00-20:59
    Evening,
    /// 21:00-04:59
    Night,
}

impl DaySlot {
    pub const ALL: [DaySlot; 4] = [
        DaySlot::Morning,
        DaySlot::Afternoon,
        DaySlot::Evening,
        DaySlot::Night,
    ];

    pub fn from_hour(hour: u8) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Morning => 0,
            Self::Afternoon => 1,
            Self::Evening => 2,
            Self::Night => 3,
        }
    }
}

/// Completion counts indexed by `[day_of_week][slot]`, Sunday = 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimePattern {
    pub grid: [[u32; 4]; 7],
    /// Largest single cell, for intensity scaling.
    pub max_count: u32,
    /// Slot with the most completions across all days; `None` without data.
    pub best_slot: Option<DaySlot>,
}

impl TimePattern {
    pub fn count(&self, day_of_week: u8, slot: DaySlot) -> u32 {
        self.grid
            .get(usize::from(day_of_week))
            .map_or(0, |row| row[slot.index()])
    }

    pub fn total(&self) -> u32 {
        self.grid.iter().flatten().sum()
    }
}

/// Builds the weekday × slot grid from completed tasks with derived timing.
pub fn time_pattern(tasks: &TaskCollection) -> TimePattern {
    let mut pattern = TimePattern::default();

    for task in tasks.iter().filter(|task| task.status == TaskStatus::Completed) {
        let (Some(hour), Some(day)) = (task.completed_at_hour, task.day_of_week) else {
            continue;
        };
        let Some(row) = pattern.grid.get_mut(usize::from(day)) else {
            continue;
        };
        let cell = &mut row[DaySlot::from_hour(hour).index()];
        *cell += 1;
        pattern.max_count = pattern.max_count.max(*cell);
    }

    let mut best: Option<(DaySlot, u32)> = None;
    for slot in DaySlot::ALL {
        let total: u32 = pattern.grid.iter().map(|row| row[slot.index()]).sum();
        if total > 0 && best.map_or(true, |(_, top)| total > top) {
            best = Some((slot, total));
        }
    }
    pattern.best_slot = best.map(|(slot, _)| slot);
    pattern
}

/// Today's completions against the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyGoalProgress {
    pub done_today: usize,
    /// Explicit goal from settings, or the recent daily average (min 1).
    pub goal: usize,
}

impl DailyGoalProgress {
    pub fn achieved(&self) -> bool {
        self.done_today >= self.goal
    }

    /// Completion ratio capped at 1.0.
    pub fn ratio(&self) -> f64 {
        if self.goal == 0 {
            return 1.0;
        }
        (self.done_today as f64 / self.goal as f64).min(1.0)
    }
}

pub fn daily_goal_progress(
    tasks: &TaskCollection,
    settings: &AppSettings,
    now: EpochMs,
    offset: FixedOffset,
) -> DailyGoalProgress {
    let today = local_date(now, offset);
    let done_today = completion_times(tasks)
        .filter(|done_at| today.is_some() && local_date(*done_at, offset) == today)
        .count();

    let goal = if settings.daily_goal > 0 {
        settings.daily_goal as usize
    } else {
        let window_start = start_of_local_day(now, offset) - (GOAL_WINDOW_DAYS - 1) * DAY_MS;
        let recent = completion_times(tasks)
            .filter(|done_at| *done_at >= window_start)
            .count();
        // round(recent / 7), halves rounding up
        ((2 * recent + 7) / 14).max(1)
    };

    DailyGoalProgress { done_today, goal }
}

/// Completions on one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    /// Local midnight opening the day.
    pub day_start: EpochMs,
    pub count: usize,
}

impl DayCount {
    /// 0-6 from Sunday, the same scale as `Task::day_of_week`.
    pub fn day_of_week(&self) -> u8 {
        self.date.weekday().num_days_from_sunday() as u8
    }
}

/// Per-day completion counts for the seven local days ending today, oldest
/// first.
pub fn weekly_completions(
    tasks: &TaskCollection,
    now: EpochMs,
    offset: FixedOffset,
) -> Vec<DayCount> {
    let today_start = start_of_local_day(now, offset);
    (0..7)
        .rev()
        .filter_map(|days_ago| {
            let day_start = today_start - days_ago * DAY_MS;
            let date = local_date(day_start, offset)?;
            let count = completion_times(tasks)
                .filter(|done_at| (day_start..day_start + DAY_MS).contains(done_at))
                .count();
            Some(DayCount {
                date,
                day_start,
                count,
            })
        })
        .collect()
}

/// Window for the completed-history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryRange {
    /// Completed on the current local day.
    Today,
    /// Completed within the last seven days (rolling, not calendar days).
    #[default]
    LastSevenDays,
    All,
}

/// Completed tasks with a completion time inside `range`, most recent first.
pub fn completed_history(
    tasks: &TaskCollection,
    range: HistoryRange,
    now: EpochMs,
    offset: FixedOffset,
) -> Vec<&Task> {
    let today = local_date(now, offset);
    let in_range = |done_at: EpochMs| match range {
        HistoryRange::Today => today.is_some() && local_date(done_at, offset) == today,
        HistoryRange::LastSevenDays => done_at >= now - HISTORY_WINDOW_DAYS * DAY_MS,
        HistoryRange::All => true,
    };

    let mut history: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Completed)
        .filter(|task| task.done_at.is_some_and(|done_at| in_range(done_at)))
        .collect();
    history.sort_by_key(|task| Reverse(task.done_at));
    history
}

/// Tasks archived within the last `within_days` days, newest archive first.
pub fn recently_archived(tasks: &TaskCollection, now: EpochMs, within_days: i64) -> Vec<&Task> {
    let mut archived: Vec<&Task> = tasks
        .iter()
        .filter(|task| {
            task.archived_at
                .is_some_and(|archived_at| now - archived_at <= within_days * DAY_MS)
        })
        .collect();
    archived.sort_by_key(|task| Reverse(task.archived_at));
    archived
}

/// Every tag in use, sorted and without duplicates.
pub fn all_tags(tasks: &TaskCollection) -> Vec<String> {
    tasks
        .iter()
        .flat_map(|task| task.tags.iter())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Tasks carrying at least one of `selected`; an empty selection keeps all.
pub fn filter_by_tags<'a>(tasks: &'a TaskCollection, selected: &[String]) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| selected.is_empty() || selected.iter().any(|tag| task.has_tag(tag)))
        .collect()
}

/// A captured or deferred task waiting past its lane's threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleTask {
    pub id: TaskId,
    pub status: TaskStatus,
    /// Whole days since creation.
    pub age_days: i64,
}

/// Lists non-archived captured tasks older than 30 days and deferred tasks
/// older than 60 days, in collection order.
pub fn stale_tasks(tasks: &TaskCollection, now: EpochMs) -> Vec<StaleTask> {
    tasks
        .iter()
        .filter(|task| !task.is_archived())
        .filter(|task| is_stale(task, now))
        .map(|task| StaleTask {
            id: task.id.clone(),
            status: task.status,
            age_days: (now - task.created_at).div_euclid(DAY_MS),
        })
        .collect()
}

/// Action that pulls a stale task into today's work: queued behind the
/// current focus item, or focused directly when nothing is active.
pub fn pull_into_today(tasks: &TaskCollection, id: &str, now: EpochMs) -> Action {
    let id = id.to_string();
    if tasks.active().is_some() {
        Action::MoveTo {
            id,
            to: TaskStatus::Queued,
            now,
        }
    } else {
        Action::SetActive { id, now }
    }
}

fn is_stale(task: &Task, now: EpochMs) -> bool {
    let threshold_days = match task.status {
        TaskStatus::Captured => CAPTURED_STALE_DAYS,
        TaskStatus::Deferred => DEFERRED_STALE_DAYS,
        _ => return false,
    };
    now - task.created_at > threshold_days * DAY_MS
}

fn completion_times(tasks: &TaskCollection) -> impl Iterator<Item = EpochMs> + '_ {
    tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Completed)
        .filter_map(|task| task.done_at)
}

fn local_date(at: EpochMs, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(at).map(|dt| dt.with_timezone(&offset).date_naive())
}

fn start_of_local_day(at: EpochMs, offset: FixedOffset) -> EpochMs {
    let shift = i64::from(offset.local_minus_utc()) * 1_000;
    let local = at + shift;
    local - local.rem_euclid(DAY_MS) - shift
}
