use std::{sync::Arc, time::Duration};

use simple_timer::{
    error::PluginError,
    services::{BroadcastSink, PluginEvent, COMPLETION_MESSAGE},
    state::{SettingsStore, TimerEngine, TimerState, KEY_RECENT_TIMERS, KEY_SUBTLE_MODE},
};
use tempfile::{tempdir, TempDir};
use tokio::{sync::broadcast, time::sleep};

struct Harness {
    _dir: TempDir,
    settings_dir: std::path::PathBuf,
    engine: Arc<TimerEngine>,
    rx: broadcast::Receiver<PluginEvent>,
}

fn harness() -> Harness {
    let dir = tempdir().unwrap();
    let settings_dir = dir.path().to_path_buf();
    let sink = BroadcastSink::new(256);
    let rx = sink.subscribe();
    let engine = Arc::new(TimerEngine::new(SettingsStore::new(&settings_dir), Arc::new(sink)));
    Harness {
        _dir: dir,
        settings_dir,
        engine,
        rx,
    }
}

fn drain(rx: &mut broadcast::Receiver<PluginEvent>) -> Vec<PluginEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn remaining_values(events: &[PluginEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            PluginEvent::RemainingSecondsChanged { seconds } => Some(*seconds),
            _ => None,
        })
        .collect()
}

fn completions(events: &[PluginEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|e| match e {
            PluginEvent::TimerCompleted { subtle, .. } => Some(*subtle),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_thirty_second_timer_counts_down_and_completes() {
    let mut h = harness();
    h.engine.start_timer(30).unwrap();

    sleep(Duration::from_secs(31)).await;
    let events = drain(&mut h.rx);

    assert_eq!(events[0], PluginEvent::RecentsChanged { recents: vec![30] });
    assert_eq!(remaining_values(&events), vec![30, 25, 20, 15, 10, 5, 0]);
    assert_eq!(completions(&events), vec![false]);
    assert_eq!(
        events.last(),
        Some(&PluginEvent::TimerCompleted {
            message: COMPLETION_MESSAGE.to_string(),
            subtle: false,
        })
    );
    assert_eq!(h.engine.timer_state().unwrap(), TimerState::idle());
}

#[tokio::test(start_paused = true)]
async fn test_uneven_duration_never_reports_negative() {
    let mut h = harness();
    h.engine.start_timer(12).unwrap();

    sleep(Duration::from_secs(16)).await;
    let events = drain(&mut h.rx);

    assert_eq!(remaining_values(&events), vec![12, 7, 2, 0]);
    assert_eq!(completions(&events).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_remaining_is_tracked_between_ticks() {
    let h = harness();
    h.engine.start_timer(20).unwrap();

    sleep(Duration::from_secs(6)).await;
    assert_eq!(h.engine.timer_state().unwrap(), TimerState::running(15));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_countdown_suppresses_completion() {
    let mut h = harness();
    h.engine.start_timer(30).unwrap();

    sleep(Duration::from_secs(12)).await;
    h.engine.cancel_timer().unwrap();
    sleep(Duration::from_secs(60)).await;

    let events = drain(&mut h.rx);
    assert_eq!(remaining_values(&events), vec![30, 25, 20, 0]);
    assert!(completions(&events).is_empty());
    assert_eq!(h.engine.timer_state().unwrap(), TimerState::idle());
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_running_countdown() {
    let mut h = harness();
    h.engine.start_timer(30).unwrap();
    sleep(Duration::from_secs(7)).await;

    h.engine.start_timer(10).unwrap();
    sleep(Duration::from_secs(40)).await;

    let events = drain(&mut h.rx);
    assert_eq!(remaining_values(&events), vec![30, 25, 10, 5, 0]);
    assert_eq!(completions(&events).len(), 1);
    assert_eq!(h.engine.recents().unwrap(), vec![10, 30]);
}

#[tokio::test(start_paused = true)]
async fn test_zero_second_timer_completes_immediately() {
    let mut h = harness();
    h.engine.start_timer(0).unwrap();
    sleep(Duration::from_millis(1)).await;

    let events = drain(&mut h.rx);
    assert_eq!(remaining_values(&events), vec![0, 0]);
    assert_eq!(completions(&events).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_completion_carries_subtle_mode() {
    let mut h = harness();
    h.engine.set_subtle_mode(true).unwrap();
    h.engine.start_timer(5).unwrap();

    sleep(Duration::from_secs(6)).await;
    let events = drain(&mut h.rx);

    assert_eq!(events[0], PluginEvent::SubtleModeChanged { subtle: true });
    assert_eq!(completions(&events), vec![true]);
}

#[tokio::test]
async fn test_recents_are_capped_and_persisted() {
    let h = harness();
    for seconds in [60, 120, 180, 240, 300, 360, 420] {
        h.engine.start_timer(seconds).unwrap();
        assert!(h.engine.recents().unwrap().len() <= 5);
    }
    h.engine.cancel_timer().unwrap();

    assert_eq!(h.engine.recents().unwrap(), vec![420, 360, 300, 240, 180]);

    let mut fresh = SettingsStore::new(&h.settings_dir);
    fresh.read().unwrap();
    assert_eq!(
        fresh.get(KEY_RECENT_TIMERS, Vec::<u64>::new()),
        vec![420, 360, 300, 240, 180]
    );
}

#[tokio::test]
async fn test_subtle_mode_survives_fresh_read() {
    let mut h = harness();
    h.engine.set_subtle_mode(true).unwrap();

    assert_eq!(drain(&mut h.rx), vec![PluginEvent::SubtleModeChanged { subtle: true }]);

    let mut fresh = SettingsStore::new(&h.settings_dir);
    fresh.read().unwrap();
    assert!(fresh.get(KEY_SUBTLE_MODE, false));
}

#[tokio::test]
async fn test_load_recents_is_idempotent() {
    let mut h = harness();
    h.engine.start_timer(90).unwrap();
    h.engine.cancel_timer().unwrap();
    drain(&mut h.rx);

    h.engine.load_recents().unwrap();
    h.engine.load_recents().unwrap();
    let events = drain(&mut h.rx);

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], events[1]);
    assert_eq!(events[0], PluginEvent::RecentsChanged { recents: vec![90] });
}

#[tokio::test]
async fn test_on_init_publishes_persisted_state() {
    let mut h = harness();
    let mut store = SettingsStore::new(&h.settings_dir);
    store.set(KEY_SUBTLE_MODE, true).unwrap();
    store.set(KEY_RECENT_TIMERS, vec![300u64, 600]).unwrap();
    store.commit().unwrap();

    h.engine.on_init().unwrap();
    h.engine.load_remaining_seconds().unwrap();

    assert_eq!(
        drain(&mut h.rx),
        vec![
            PluginEvent::RecentsChanged { recents: vec![300, 600] },
            PluginEvent::SubtleModeChanged { subtle: true },
            PluginEvent::RemainingSecondsChanged { seconds: 0 },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_on_unload_cancels_running_timer() {
    let mut h = harness();
    h.engine.start_timer(15).unwrap();
    sleep(Duration::from_secs(1)).await;

    h.engine.on_unload().unwrap();
    sleep(Duration::from_secs(30)).await;

    let events = drain(&mut h.rx);
    assert_eq!(remaining_values(&events), vec![15, 0]);
    assert!(completions(&events).is_empty());
}

#[tokio::test]
async fn test_commit_failure_propagates_without_side_effects() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let sink = BroadcastSink::default();
    let mut rx = sink.subscribe();
    let engine = Arc::new(TimerEngine::new(
        SettingsStore::new(blocker.join("settings")),
        Arc::new(sink),
    ));

    assert!(matches!(engine.start_timer(30), Err(PluginError::Io { .. })));
    assert!(drain(&mut rx).is_empty());
    assert_eq!(engine.timer_state().unwrap(), TimerState::idle());

    assert!(matches!(engine.set_subtle_mode(true), Err(PluginError::Io { .. })));
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_starts_keep_recents_head_in_sync() {
    let h = harness();

    let starts: Vec<_> = (1..=8u64)
        .map(|i| {
            let engine = Arc::clone(&h.engine);
            tokio::spawn(async move { engine.start_timer(i * 100).unwrap() })
        })
        .collect();
    for start in starts {
        start.await.unwrap();
    }

    let recents = h.engine.recents().unwrap();
    let state = h.engine.timer_state().unwrap();
    assert_eq!(recents.len(), 5);
    assert!(state.running);
    assert_eq!(recents[0], state.seconds_remaining);

    h.engine.cancel_timer().unwrap();
}
