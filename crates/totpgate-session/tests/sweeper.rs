//! Integration tests for the background session sweeper.
//!
//! Uses `start_paused = true` so Tokio's clock only moves when every task
//! is idle: a `sleep(301 s)` completes instantly, but only after the
//! sweeper's 300 s tick has fired. Session expiry runs on a separate
//! `ManualClock`, so the two notions of time are controlled independently.

use std::sync::Arc;
use std::time::Duration;

use totpgate_session::{Clock, ManualClock, Session, SessionStore, Sweeper};

const INTERVAL: Duration = Duration::from_secs(300);

fn setup() -> (Arc<SessionStore>, Arc<ManualClock>) {
    (Arc::new(SessionStore::new()), Arc::new(ManualClock::at_unix(1_000)))
}

fn add(store: &SessionStore, clock: &ManualClock, token: &str, ttl_secs: u64) {
    store.put(Session::new(token, clock.now(), Duration::from_secs(ttl_secs), "10.0.0.1"));
}

async fn let_sweeper_run(ticks: u32) {
    tokio::time::sleep(INTERVAL * ticks + Duration::from_secs(1)).await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_evicts_expired_sessions_on_tick() {
    let (store, clock) = setup();
    add(&store, &clock, "short", 60);
    add(&store, &clock, "long", 3_600);

    let sweeper = Sweeper::spawn(store.clone(), clock.clone(), INTERVAL).unwrap();

    clock.advance(Duration::from_secs(120));
    let_sweeper_run(1).await;

    assert!(store.get("short").is_none(), "expired session should be swept");
    assert!(store.get("long").is_some(), "live session must survive");

    sweeper.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_does_not_sweep_before_first_interval() {
    let (store, clock) = setup();
    add(&store, &clock, "short", 1);
    clock.advance(Duration::from_secs(10));

    let sweeper = Sweeper::spawn(store.clone(), clock.clone(), INTERVAL).unwrap();
    tokio::time::sleep(INTERVAL / 2).await;

    assert_eq!(store.len(), 1, "first sweep is one interval after spawn");
    sweeper.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_keeps_running_across_ticks() {
    let (store, clock) = setup();
    let sweeper = Sweeper::spawn(store.clone(), clock.clone(), INTERVAL).unwrap();

    for round in 0..3 {
        add(&store, &clock, &format!("s{round}"), 10);
        clock.advance(Duration::from_secs(60));
        let_sweeper_run(1).await;
        assert!(store.is_empty(), "round {round} should be swept");
    }

    sweeper.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_task() {
    let (store, clock) = setup();
    let sweeper = Sweeper::spawn(store.clone(), clock, INTERVAL).unwrap();
    assert!(!sweeper.is_finished());

    sweeper.shutdown().await;

    // The task held the only other reference to the store.
    assert_eq!(Arc::strong_count(&store), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent() {
    let (store, clock) = setup();
    let sweeper = Sweeper::spawn(store, clock, INTERVAL).unwrap();

    sweeper.stop();
    sweeper.stop();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(sweeper.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_task() {
    let (store, clock) = setup();
    let sweeper = Sweeper::spawn(store.clone(), clock.clone(), INTERVAL).unwrap();

    drop(sweeper);
    let_sweeper_run(2).await;

    assert_eq!(Arc::strong_count(&store), 1, "task should have released the store");
    add(&store, &clock, "late", 1);
    clock.advance(Duration::from_secs(60));
    let_sweeper_run(1).await;
    assert_eq!(store.len(), 1, "no sweeper is running any more");
}
