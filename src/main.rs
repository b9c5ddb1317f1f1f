//! Multi Timer - A registry of independent countdown timers
//!
//! This is the console front end: it reads commands from stdin, forwards them
//! to the timer registry and renders what the registry publishes.

use anyhow::bail;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};

use multi_timer::{
    config::Config,
    console::{self, ConsoleCommand, JsonEvent},
    utils::shutdown_signal,
    TimerApp, TimerError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so rendered output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(format!("multi_timer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting multi-timer v1.0.0");
    info!("Configuration: unit={}, default_duration={}, json={}",
          config.unit.label(), config.default_duration, config.json);

    let app = TimerApp::spawn();

    // JSON mode streams every snapshot change
    if config.json {
        let mut snapshots = app.subscribe_snapshots();
        tokio::spawn(async move {
            while snapshots.changed().await.is_ok() {
                let timers = snapshots.borrow_and_update().clone();
                match (JsonEvent::Snapshot { timers: &timers }).to_line() {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("Failed to encode snapshot: {}", e),
                }
            }
        });
    }

    // Completion notices
    let mut completions = app.subscribe_completions();
    let json = config.json;
    tokio::spawn(async move {
        loop {
            match completions.recv().await {
                Ok(completion) if json => match JsonEvent::Completion(&completion).to_line() {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("Failed to encode completion: {}", e),
                },
                Ok(completion) => println!("{}", console::render_completion(&completion)),
                Err(RecvError::Lagged(missed)) => warn!("Missed {} completion notices", missed),
                Err(RecvError::Closed) => break,
            }
        }
    });

    if !config.json {
        println!("{}", console::HELP);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("End of input");
                    break;
                };

                let command = match console::parse_line(&line) {
                    Ok(Some(ConsoleCommand::Quit)) => break,
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };

                match run_command(&app, &config, command).await {
                    Ok(()) => {}
                    Err(TimerError::ServiceStopped) => bail!("timer registry stopped unexpectedly"),
                    Err(e) => println!("Error: {}", e),
                }
            }

            result = &mut shutdown => {
                result?;
                info!("Shutdown signal received");
                break;
            }
        }
    }

    app.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

/// Forward one console command to the registry and print the outcome
async fn run_command(
    app: &TimerApp,
    config: &Config,
    command: ConsoleCommand,
) -> Result<(), TimerError> {
    match command {
        ConsoleCommand::Add { name, amount } => {
            let seconds = console::add_seconds(amount, config.default_duration, config.unit);
            let Some(seconds) = seconds else {
                println!("Duration is too large");
                return Ok(());
            };
            let id = app.create(name, seconds).await?;
            if !config.json {
                println!("Created timer #{}", id);
            }
        }
        ConsoleCommand::Start(id) => app.start(id).await?,
        ConsoleCommand::Pause(id) => app.pause(id).await?,
        ConsoleCommand::Reset(id) => app.reset(id).await?,
        ConsoleCommand::Remove(id) => {
            if !app.remove(id).await? && !config.json {
                println!("No timer #{}", id);
            }
        }
        ConsoleCommand::List if config.json => {
            let timers = app.snapshot().await?;
            match (JsonEvent::Snapshot { timers: &timers }).to_line() {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to encode snapshot: {}", e),
            }
            return Ok(());
        }
        ConsoleCommand::List => {}
        ConsoleCommand::Help => {
            println!("{}", console::HELP);
            return Ok(());
        }
        ConsoleCommand::Quit => return Ok(()),
    }

    // Human mode shows the list after each command instead of every tick
    if !config.json {
        println!("{}", console::render_snapshot(&app.snapshot().await?));
    }
    Ok(())
}
