//! End-to-end tests of the timer service on virtual time
//!
//! Every test runs with the tokio clock paused, so sleeping advances time
//! instantly and each one-second tick lands deterministically.

use std::time::Duration;

use multi_timer::{TimerApp, TimerError, TimerId, TimerState, TimerView};
use tokio::time::sleep;

fn find(snapshot: &[TimerView], id: TimerId) -> &TimerView {
    snapshot.iter().find(|t| t.id == id).expect("timer in snapshot")
}

async fn view(app: &TimerApp, id: TimerId) -> TimerView {
    let snapshot = app.snapshot().await.unwrap();
    find(&snapshot, id).clone()
}

#[tokio::test(start_paused = true)]
async fn test_break_counts_down_and_finishes() {
    let app = TimerApp::spawn();
    let mut completions = app.subscribe_completions();

    let id = app.create("Break", 5).await.unwrap();
    assert_eq!(view(&app, id).await.remaining_formatted, "00:05");

    app.start(id).await.unwrap();
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(view(&app, id).await.remaining_seconds, 3);

    sleep(Duration::from_secs(3)).await;
    let finished = view(&app, id).await;
    assert_eq!(finished.state, TimerState::Finished);
    assert_eq!(finished.remaining_seconds, 0);
    assert_eq!(finished.remaining_formatted, "00:00");

    let completion = completions.try_recv().unwrap();
    assert_eq!(completion.id, id);
    assert_eq!(completion.name, "Break");
    assert!(completions.try_recv().is_err(), "Exactly one completion");
}

#[tokio::test(start_paused = true)]
async fn test_workout_pause_and_resume_without_drift() {
    let app = TimerApp::spawn();
    let id = app.create("Workout", 125).await.unwrap();
    assert_eq!(view(&app, id).await.remaining_formatted, "02:05");

    app.start(id).await.unwrap();
    sleep(Duration::from_millis(3500)).await;
    app.pause(id).await.unwrap();
    assert_eq!(view(&app, id).await.remaining_seconds, 122);

    // Paused time does not count
    sleep(Duration::from_secs(10)).await;
    let paused = view(&app, id).await;
    assert_eq!(paused.remaining_seconds, 122);
    assert_eq!(paused.state, TimerState::Paused);

    app.start(id).await.unwrap();
    sleep(Duration::from_millis(121_500)).await;
    let running = view(&app, id).await;
    assert_eq!(running.remaining_seconds, 1);
    assert_eq!(running.state, TimerState::Running);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(view(&app, id).await.state, TimerState::Finished);
}

#[tokio::test(start_paused = true)]
async fn test_double_start_ticks_once_per_second() {
    let app = TimerApp::spawn();
    let id = app.create("Tea", 10).await.unwrap();

    app.start(id).await.unwrap();
    app.start(id).await.unwrap();
    sleep(Duration::from_millis(1500)).await;

    assert_eq!(view(&app, id).await.remaining_seconds, 9);
}

#[tokio::test(start_paused = true)]
async fn test_remove_during_countdown() {
    let app = TimerApp::spawn();
    let mut completions = app.subscribe_completions();
    let doomed = app.create("Pasta", 3).await.unwrap();
    let survivor = app.create("Sauce", 60).await.unwrap();

    app.start(doomed).await.unwrap();
    app.start(survivor).await.unwrap();
    sleep(Duration::from_millis(1500)).await;

    assert!(app.remove(doomed).await.unwrap());
    assert!(!app.remove(doomed).await.unwrap(), "Removing twice is a no-op");

    sleep(Duration::from_secs(5)).await;
    let snapshot = app.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(find(&snapshot, survivor).remaining_seconds, 54);
    assert!(completions.try_recv().is_err(), "Removed timer never completes");
}

#[tokio::test(start_paused = true)]
async fn test_invalid_input_is_rejected() {
    let app = TimerApp::spawn();

    assert!(matches!(app.create("", 10).await, Err(TimerError::InvalidInput { .. })));
    assert!(matches!(app.create("X", 0).await, Err(TimerError::InvalidInput { .. })));
    assert!(app.snapshot().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_ids() {
    let app = TimerApp::spawn();
    let missing = TimerId(99);

    assert_eq!(app.start(missing).await, Err(TimerError::NotFound(missing)));
    assert_eq!(app.pause(missing).await, Err(TimerError::NotFound(missing)));
    assert_eq!(app.reset(missing).await, Err(TimerError::NotFound(missing)));
    assert_eq!(app.remove(missing).await, Ok(false));
}

#[tokio::test(start_paused = true)]
async fn test_reset_after_finish_allows_restart() {
    let app = TimerApp::spawn();
    let id = app.create("Eggs", 2).await.unwrap();

    app.start(id).await.unwrap();
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(view(&app, id).await.state, TimerState::Finished);

    // Start on a finished timer does nothing
    app.start(id).await.unwrap();
    assert_eq!(view(&app, id).await.state, TimerState::Finished);

    app.reset(id).await.unwrap();
    let reset = view(&app, id).await;
    assert_eq!(reset.state, TimerState::Idle);
    assert_eq!(reset.remaining_seconds, 2);

    app.start(id).await.unwrap();
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(view(&app, id).await.remaining_seconds, 1);
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_channel_follows_ticks() {
    let app = TimerApp::spawn();
    let mut snapshots = app.subscribe_snapshots();
    let id = app.create("Tea", 10).await.unwrap();
    app.start(id).await.unwrap();

    sleep(Duration::from_millis(2500)).await;
    assert!(snapshots.has_changed().unwrap());
    let latest = snapshots.borrow_and_update().clone();
    assert_eq!(find(&latest, id).remaining_seconds, 8);
    assert_eq!(app.latest_snapshot(), latest);

    // Redundant commands publish nothing new
    app.start(id).await.unwrap();
    assert!(!snapshots.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_independent_cadences() {
    let app = TimerApp::spawn();
    let first = app.create("First", 30).await.unwrap();
    let second = app.create("Second", 30).await.unwrap();

    app.start(first).await.unwrap();
    sleep(Duration::from_millis(400)).await;
    app.start(second).await.unwrap();
    sleep(Duration::from_millis(2200)).await;
    app.pause(first).await.unwrap();
    sleep(Duration::from_secs(3)).await;

    let snapshot = app.snapshot().await.unwrap();
    assert_eq!(find(&snapshot, first).remaining_seconds, 28);
    assert_eq!(find(&snapshot, second).remaining_seconds, 25);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_the_service() {
    let app = TimerApp::spawn();
    let id = app.create("Tea", 10).await.unwrap();
    app.start(id).await.unwrap();

    app.shutdown().await;

    assert_eq!(app.create("Late", 5).await, Err(TimerError::ServiceStopped));
    assert_eq!(app.snapshot().await, Err(TimerError::ServiceStopped));
    let last = app.latest_snapshot();
    assert_eq!(find(&last, id).state, TimerState::Paused);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_last_handle_stops_the_service() {
    let app = TimerApp::spawn();
    let mut snapshots = app.subscribe_snapshots();
    let id = app.create("Tea", 10).await.unwrap();
    app.start(id).await.unwrap();

    drop(app);

    // The task publishes a final snapshot with every driver cancelled, then exits
    sleep(Duration::from_secs(3)).await;
    let last = snapshots.borrow_and_update().clone();
    let timer = find(&last, id);
    assert_eq!(timer.state, TimerState::Paused);
    assert_eq!(timer.remaining_seconds, 10);
    assert!(snapshots.changed().await.is_err());
}
