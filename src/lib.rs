//! Multi Timer - A registry of independent countdown timers
//!
//! This library provides a timer registry that owns named countdown timers,
//! enforces their Idle/Running/Paused/Finished lifecycle and drives each
//! running timer with its own one-second tick. UI layers talk to it through
//! [`TimerApp`] and re-render from the published snapshots.

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::TimerApp;
pub use config::{Config, DurationUnit};
pub use error::TimerError;
pub use state::{Completion, TimerId, TimerRegistry, TimerState, TimerView};
pub use utils::signals::shutdown_signal;
