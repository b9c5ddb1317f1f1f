//! Per-timer tick drivers
//!
//! Each running timer gets its own recurring one-second driver. Drivers do not
//! touch timer state themselves: every tick is delivered as a [`Tick`] message
//! carrying only ids, and the registry decides what the tick means.

use std::{collections::HashMap, time::Duration};

use tokio::{
    sync::mpsc,
    task::AbortHandle,
    time::{interval_at, Instant},
};
use tracing::debug;

use crate::state::TimerId;

/// Cadence of every timer driver
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Opaque handle identifying one scheduled driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverId(u64);

impl DriverId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// One elapsed period for a running timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub timer: TimerId,
    pub driver: DriverId,
}

/// Something that can drive periodic ticks for timers
pub trait TickScheduler {
    /// Begin producing ticks for `timer` until the returned driver is cancelled
    fn schedule(&mut self, timer: TimerId) -> DriverId;

    /// Stop a driver. Cancelling an unknown or already cancelled driver is a no-op.
    fn cancel(&mut self, driver: DriverId);
}

/// Tokio-backed scheduler: one interval task per driver, ticks sent over a channel
#[derive(Debug)]
pub struct IntervalScheduler {
    ticks: mpsc::UnboundedSender<Tick>,
    period: Duration,
    next_driver: u64,
    drivers: HashMap<DriverId, AbortHandle>,
}

impl IntervalScheduler {
    /// Create a scheduler delivering ticks every [`TICK_PERIOD`]
    pub fn new(ticks: mpsc::UnboundedSender<Tick>) -> Self {
        Self::with_period(ticks, TICK_PERIOD)
    }

    /// Create a scheduler delivering ticks at a custom cadence
    pub fn with_period(ticks: mpsc::UnboundedSender<Tick>, period: Duration) -> Self {
        Self {
            ticks,
            period,
            next_driver: 1,
            drivers: HashMap::new(),
        }
    }

    /// Number of drivers currently scheduled
    pub fn active_drivers(&self) -> usize {
        self.drivers.len()
    }
}

impl TickScheduler for IntervalScheduler {
    fn schedule(&mut self, timer: TimerId) -> DriverId {
        let driver = DriverId(self.next_driver);
        self.next_driver += 1;

        let ticks = self.ticks.clone();
        let period = self.period;
        // Fresh phase: the first tick lands one full period after scheduling
        let first_tick = Instant::now() + period;

        let task = tokio::spawn(async move {
            let mut interval = interval_at(first_tick, period);
            loop {
                interval.tick().await;
                if ticks.send(Tick { timer, driver }).is_err() {
                    // Registry is gone
                    break;
                }
            }
        });

        debug!("Scheduled driver {:?} for timer {}", driver, timer);
        self.drivers.insert(driver, task.abort_handle());
        driver
    }

    fn cancel(&mut self, driver: DriverId) {
        if let Some(handle) = self.drivers.remove(&driver) {
            handle.abort();
            debug!("Cancelled driver {:?}", driver);
        }
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.drivers.drain() {
            handle.abort();
        }
    }
}
