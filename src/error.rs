//! Error types for timer operations

use thiserror::Error;

use crate::state::TimerId;

/// Errors surfaced to callers of the timer registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("invalid timer input: {reason}")]
    InvalidInput { reason: &'static str },

    #[error("timer {0} not found")]
    NotFound(TimerId),

    #[error("timer service is no longer running")]
    ServiceStopped,
}

impl TimerError {
    pub(crate) fn empty_name() -> Self {
        Self::InvalidInput { reason: "name must not be empty" }
    }

    pub(crate) fn zero_duration() -> Self {
        Self::InvalidInput { reason: "duration must be a positive number of seconds" }
    }
}
