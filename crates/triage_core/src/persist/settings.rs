//! User-facing settings stored next to the task list.

use serde::{Deserialize, Serialize};

pub const DEFAULT_POMODORO_MINUTES: u32 = 25;

/// Settings record persisted inside the current document version.
///
/// Missing fields fall back to their defaults on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Focus timer length.
    pub pomodoro_minutes: u32,
    /// Completed-per-day target; `0` derives the goal from recent history.
    pub daily_goal: u32,
    /// Toggle for the assisted task breakdown surface.
    #[serde(rename = "enableAI")]
    pub enable_ai: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            pomodoro_minutes: DEFAULT_POMODORO_MINUTES,
            daily_goal: 0,
            enable_ai: false,
        }
    }
}
