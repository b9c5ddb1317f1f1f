//! State management module
//!
//! This module contains the timer records and the registry that owns them.

pub mod registry;
pub mod timer;

// Re-export main types
pub use registry::{TickOutcome, TimerRegistry};
pub use timer::{format_remaining, Completion, TimerId, TimerState, TimerView};
