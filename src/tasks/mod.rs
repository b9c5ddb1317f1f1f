//! Background tasks module
//!
//! This module contains the tick drivers and the task that owns the registry.

pub mod registry_task;
pub mod tick_scheduler;

// Re-export main types
pub use registry_task::{registry_task, Command, Notifiers};
pub use tick_scheduler::{DriverId, IntervalScheduler, Tick, TickScheduler, TICK_PERIOD};
