//! Timer record, its lifecycle states and the read-only views handed to renderers

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tasks::DriverId;

/// Registry-assigned timer identity. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a single timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Finished,
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Finished => "finished",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A countdown timer record as stored by the registry.
///
/// `driver` is set exactly while the timer is running and is only ever
/// handed back to the scheduler that issued it.
#[derive(Debug)]
pub(crate) struct Timer {
    pub id: TimerId,
    pub name: String,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub state: TimerState,
    pub driver: Option<DriverId>,
}

impl Timer {
    pub fn new(id: TimerId, name: String, total_seconds: u64) -> Self {
        Self {
            id,
            name,
            total_seconds,
            remaining_seconds: total_seconds,
            state: TimerState::Idle,
            driver: None,
        }
    }

    pub fn view(&self) -> TimerView {
        TimerView {
            id: self.id,
            name: self.name.clone(),
            total_seconds: self.total_seconds,
            remaining_seconds: self.remaining_seconds,
            remaining_formatted: format_remaining(self.remaining_seconds),
            state: self.state,
        }
    }
}

/// Immutable per-timer view used for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerView {
    pub id: TimerId,
    pub name: String,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    /// Remaining time as `MM:SS`
    pub remaining_formatted: String,
    pub state: TimerState,
}

impl TimerView {
    /// Whether a start control should be offered for this timer
    pub fn can_start(&self) -> bool {
        self.state != TimerState::Running && self.remaining_seconds > 0
    }

    /// Whether a pause control should be offered for this timer
    pub fn can_pause(&self) -> bool {
        self.state == TimerState::Running
    }
}

/// Emitted once each time a timer counts down to zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub id: TimerId,
    pub name: String,
    pub finished_at: DateTime<Utc>,
}

/// Format seconds as zero-padded `MM:SS`. Minutes do not roll over into hours.
pub fn format_remaining(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
