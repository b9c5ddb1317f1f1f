//! Timer registry: the authoritative store of timers and their transitions
//!
//! The registry is the only component that mutates timer records. It asks its
//! [`TickScheduler`] for a driver when a timer starts and hands the driver back
//! whenever the timer leaves the running state, so a timer never has more than
//! one driver and a stopped timer never has one.

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    error::TimerError,
    state::timer::{Completion, Timer, TimerId, TimerState, TimerView},
    tasks::{Tick, TickScheduler},
};

/// What a delivered tick did to the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick was stale (timer removed, stopped, or restarted) and dropped
    Ignored,
    /// The timer is still running with this many seconds left
    Decremented(u64),
    /// The timer reached zero
    Finished(Completion),
}

/// Owns every timer record and enforces the lifecycle state machine
#[derive(Debug)]
pub struct TimerRegistry<S: TickScheduler> {
    // Ids are assigned in increasing order, so this stays sorted by id
    timers: Vec<Timer>,
    next_id: u64,
    scheduler: S,
}

impl<S: TickScheduler> TimerRegistry<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
            scheduler,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Create an idle timer and return its fresh id
    pub fn create(&mut self, name: &str, total_seconds: u64) -> Result<TimerId, TimerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TimerError::empty_name());
        }
        if total_seconds == 0 {
            return Err(TimerError::zero_duration());
        }

        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer::new(id, name.to_string(), total_seconds));

        info!("Created timer {} '{}' for {}s", id, name, total_seconds);
        Ok(id)
    }

    /// Start or resume a timer. Running and finished timers are left alone.
    pub fn start(&mut self, id: TimerId) -> Result<(), TimerError> {
        let index = self.index_of(id).ok_or(TimerError::NotFound(id))?;
        let timer = &mut self.timers[index];

        if timer.state == TimerState::Running || timer.remaining_seconds == 0 {
            debug!("Ignoring start for timer {} in state {}", id, timer.state);
            return Ok(());
        }

        timer.driver = Some(self.scheduler.schedule(id));
        timer.state = TimerState::Running;
        info!("Started timer {} with {}s remaining", id, timer.remaining_seconds);
        Ok(())
    }

    /// Pause a running timer, keeping its remaining time
    pub fn pause(&mut self, id: TimerId) -> Result<(), TimerError> {
        let index = self.index_of(id).ok_or(TimerError::NotFound(id))?;
        let timer = &mut self.timers[index];

        if timer.state != TimerState::Running {
            debug!("Ignoring pause for timer {} in state {}", id, timer.state);
            return Ok(());
        }

        if let Some(driver) = timer.driver.take() {
            self.scheduler.cancel(driver);
        }
        timer.state = TimerState::Paused;
        info!("Paused timer {} with {}s remaining", id, timer.remaining_seconds);
        Ok(())
    }

    /// Return a timer to idle with its full duration, from any state
    pub fn reset(&mut self, id: TimerId) -> Result<(), TimerError> {
        let index = self.index_of(id).ok_or(TimerError::NotFound(id))?;
        let timer = &mut self.timers[index];

        if let Some(driver) = timer.driver.take() {
            self.scheduler.cancel(driver);
        }
        timer.remaining_seconds = timer.total_seconds;
        timer.state = TimerState::Idle;
        info!("Reset timer {} to {}s", id, timer.total_seconds);
        Ok(())
    }

    /// Delete a timer. Returns whether anything was removed; unknown ids are a no-op.
    pub fn remove(&mut self, id: TimerId) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!("Ignoring remove for unknown timer {}", id);
            return false;
        };

        let timer = self.timers.remove(index);
        if let Some(driver) = timer.driver {
            self.scheduler.cancel(driver);
        }
        info!("Removed timer {} '{}'", id, timer.name);
        true
    }

    /// Apply one tick from a driver.
    ///
    /// Ticks are only honored while the timer exists, is running, and is still
    /// backed by the driver that produced the tick. Anything else is a tick that
    /// was already queued when its driver was cancelled.
    pub fn tick_decrement(&mut self, tick: Tick) -> TickOutcome {
        let Some(index) = self.index_of(tick.timer) else {
            debug!("Dropping tick for removed timer {}", tick.timer);
            return TickOutcome::Ignored;
        };
        let timer = &mut self.timers[index];

        if timer.state != TimerState::Running || timer.driver != Some(tick.driver) {
            debug!("Dropping stale tick for timer {} in state {}", tick.timer, timer.state);
            return TickOutcome::Ignored;
        }

        timer.remaining_seconds = timer.remaining_seconds.saturating_sub(1);
        if timer.remaining_seconds > 0 {
            return TickOutcome::Decremented(timer.remaining_seconds);
        }

        if let Some(driver) = timer.driver.take() {
            self.scheduler.cancel(driver);
        }
        timer.state = TimerState::Finished;
        info!("Timer {} '{}' finished", timer.id, timer.name);

        TickOutcome::Finished(Completion {
            id: timer.id,
            name: timer.name.clone(),
            finished_at: Utc::now(),
        })
    }

    /// Insertion-ordered views of every timer
    pub fn snapshot(&self) -> Vec<TimerView> {
        self.timers.iter().map(Timer::view).collect()
    }

    /// View of a single timer
    pub fn get(&self, id: TimerId) -> Option<TimerView> {
        self.index_of(id).map(|index| self.timers[index].view())
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Cancel every driver, leaving running timers paused
    pub fn cancel_all(&mut self) {
        let mut cancelled = 0;
        for timer in &mut self.timers {
            if let Some(driver) = timer.driver.take() {
                self.scheduler.cancel(driver);
                timer.state = TimerState::Paused;
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            info!("Cancelled {} running timer(s)", cancelled);
        }
    }

    fn index_of(&self, id: TimerId) -> Option<usize> {
        self.timers.binary_search_by_key(&id, |timer| timer.id).ok()
    }
}
