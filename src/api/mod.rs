//! Client-facing timer API
//!
//! [`TimerApp`] is the handle a UI layer holds. It forwards every operation to
//! the registry task and exposes the snapshot and completion channels a
//! renderer subscribes to.

use std::sync::{Arc, Mutex};

use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{info, warn};

use crate::{
    error::TimerError,
    state::{Completion, TimerId, TimerRegistry, TimerView},
    tasks::{registry_task, Command, IntervalScheduler, Notifiers},
};

const COMMAND_BUFFER: usize = 64;
const COMPLETION_BUFFER: usize = 100;

/// Cloneable handle to a running timer registry
#[derive(Debug, Clone)]
pub struct TimerApp {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Vec<TimerView>>,
    completions: broadcast::Sender<Completion>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TimerApp {
    /// Spawn the registry task on the current tokio runtime
    pub fn spawn() -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Vec::new());
        let (completion_tx, _) = broadcast::channel(COMPLETION_BUFFER);

        let registry = TimerRegistry::new(IntervalScheduler::new(tick_tx));
        let notifiers = Notifiers {
            snapshots: snapshot_tx,
            completions: completion_tx.clone(),
        };
        let task = tokio::spawn(registry_task(registry, command_rx, tick_rx, notifiers));

        Self {
            commands: command_tx,
            snapshots: snapshot_rx,
            completions: completion_tx,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    /// Create a new idle timer
    pub async fn create(
        &self,
        name: impl Into<String>,
        total_seconds: u64,
    ) -> Result<TimerId, TimerError> {
        let name = name.into();
        self.request(|reply| Command::Create { name, total_seconds, reply }).await?
    }

    /// Start or resume a timer
    pub async fn start(&self, id: TimerId) -> Result<(), TimerError> {
        self.request(|reply| Command::Start { id, reply }).await?
    }

    /// Pause a running timer
    pub async fn pause(&self, id: TimerId) -> Result<(), TimerError> {
        self.request(|reply| Command::Pause { id, reply }).await?
    }

    /// Reset a timer to its full duration
    pub async fn reset(&self, id: TimerId) -> Result<(), TimerError> {
        self.request(|reply| Command::Reset { id, reply }).await?
    }

    /// Remove a timer; returns whether it existed
    pub async fn remove(&self, id: TimerId) -> Result<bool, TimerError> {
        self.request(|reply| Command::Remove { id, reply }).await
    }

    /// Fetch the current snapshot from the registry
    pub async fn snapshot(&self) -> Result<Vec<TimerView>, TimerError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Last published snapshot, without a round trip to the registry
    pub fn latest_snapshot(&self) -> Vec<TimerView> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified whenever the snapshot changes
    pub fn subscribe_snapshots(&self) -> watch::Receiver<Vec<TimerView>> {
        self.snapshots.clone()
    }

    /// Receiver of completion events
    pub fn subscribe_completions(&self) -> broadcast::Receiver<Completion> {
        self.completions.subscribe()
    }

    /// Stop the registry task, cancelling every driver, and wait for it to exit
    pub async fn shutdown(&self) {
        if self.commands.send(Command::Shutdown).await.is_err() {
            info!("Timer registry already stopped");
        }

        let task = match self.task.lock() {
            Ok(mut task) => task.take(),
            Err(e) => {
                warn!("Failed to lock registry task handle: {}", e);
                None
            }
        };

        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("Timer registry task ended abnormally: {}", e);
            }
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, TimerError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| TimerError::ServiceStopped)?;
        response.await.map_err(|_| TimerError::ServiceStopped)
    }
}
