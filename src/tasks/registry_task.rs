//! Background task owning the timer registry
//!
//! Commands from [`crate::api::TimerApp`] handles and ticks from the interval
//! scheduler are processed one at a time, so every registry mutation happens on
//! a single logical thread of control.

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::{
    error::TimerError,
    state::{Completion, TickOutcome, TimerId, TimerRegistry, TimerView},
    tasks::{Tick, TickScheduler},
};

/// Requests accepted by the registry task
#[derive(Debug)]
pub enum Command {
    Create {
        name: String,
        total_seconds: u64,
        reply: oneshot::Sender<Result<TimerId, TimerError>>,
    },
    Start {
        id: TimerId,
        reply: oneshot::Sender<Result<(), TimerError>>,
    },
    Pause {
        id: TimerId,
        reply: oneshot::Sender<Result<(), TimerError>>,
    },
    Reset {
        id: TimerId,
        reply: oneshot::Sender<Result<(), TimerError>>,
    },
    Remove {
        id: TimerId,
        reply: oneshot::Sender<bool>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<TimerView>>,
    },
    Shutdown,
}

/// Outgoing notification channels of the registry task
#[derive(Debug)]
pub struct Notifiers {
    pub snapshots: watch::Sender<Vec<TimerView>>,
    pub completions: broadcast::Sender<Completion>,
}

impl Notifiers {
    /// Publish the snapshot if it differs from the last one published
    fn publish_snapshot(&self, snapshot: Vec<TimerView>) {
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn publish_completion(&self, completion: Completion) {
        // No subscribers is fine; the UI may not care about completions
        if let Err(e) = self.completions.send(completion) {
            debug!("No completion subscribers for timer {}", e.0.id);
        }
    }
}

/// Run the registry until every command sender is dropped or a shutdown arrives
pub async fn registry_task<S: TickScheduler>(
    mut registry: TimerRegistry<S>,
    mut commands: mpsc::Receiver<Command>,
    mut ticks: mpsc::UnboundedReceiver<Tick>,
    notifiers: Notifiers,
) {
    info!("Starting timer registry task");
    notifiers.publish_snapshot(registry.snapshot());

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("All timer handles dropped");
                    break;
                };
                if matches!(command, Command::Shutdown) {
                    info!("Shutdown requested");
                    break;
                }
                handle_command(&mut registry, command);
                notifiers.publish_snapshot(registry.snapshot());
            }

            Some(tick) = ticks.recv() => {
                match registry.tick_decrement(tick) {
                    TickOutcome::Ignored => {}
                    TickOutcome::Decremented(remaining) => {
                        debug!("Timer {} has {}s remaining", tick.timer, remaining);
                        notifiers.publish_snapshot(registry.snapshot());
                    }
                    TickOutcome::Finished(completion) => {
                        notifiers.publish_snapshot(registry.snapshot());
                        notifiers.publish_completion(completion);
                    }
                }
            }
        }
    }

    registry.cancel_all();
    notifiers.publish_snapshot(registry.snapshot());
    info!("Timer registry task stopped");
}

fn handle_command<S: TickScheduler>(registry: &mut TimerRegistry<S>, command: Command) {
    // A dropped reply receiver only means the caller stopped waiting
    let delivered = match command {
        Command::Create { name, total_seconds, reply } => {
            let result = registry.create(&name, total_seconds);
            if let Err(e) = &result {
                warn!("Rejected timer '{}': {}", name, e);
            }
            reply.send(result).is_ok()
        }
        Command::Start { id, reply } => reply.send(registry.start(id)).is_ok(),
        Command::Pause { id, reply } => reply.send(registry.pause(id)).is_ok(),
        Command::Reset { id, reply } => reply.send(registry.reset(id)).is_ok(),
        Command::Remove { id, reply } => reply.send(registry.remove(id)).is_ok(),
        Command::Snapshot { reply } => reply.send(registry.snapshot()).is_ok(),
        Command::Shutdown => true,
    };

    if !delivered {
        debug!("Command caller went away before the reply");
    }
}
