//! End-to-end probing runs against a scripted reachability checker

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use m3u_probe::config::ProbeConfig;
use m3u_probe::errors::{ProbeError, ProbeResult};
use m3u_probe::models::{ChannelRecord, ProbeProgress};
use m3u_probe::services::{AvailabilityProber, ProbeEvent, ReachabilityCheck};
use tokio::sync::broadcast;

#[derive(Clone, Copy)]
enum Script {
    Up(u64),
    Status(u16, u64),
    Refused(u64),
    Hang,
}

/// Replays a fixed answer per URL after a fixed delay (milliseconds)
#[derive(Default)]
struct ScriptedChecker {
    scripts: HashMap<String, Script>,
    calls: AtomicUsize,
}

impl ScriptedChecker {
    fn with(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }
}

#[async_trait]
impl ReachabilityCheck for ScriptedChecker {
    async fn check(&self, url: &str) -> ProbeResult<u16> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.scripts.get(url).copied().unwrap_or(Script::Hang) {
            Script::Up(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(200)
            }
            Script::Status(status, ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(status)
            }
            Script::Refused(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Err(ProbeError::network("connection refused"))
            }
            Script::Hang => std::future::pending().await,
        }
    }
}

fn probe_config(timeout: Duration) -> ProbeConfig {
    ProbeConfig {
        timeout,
        max_concurrent: 16,
        ..ProbeConfig::default()
    }
}

fn channel(n: usize) -> ChannelRecord {
    ChannelRecord::new(format!("Channel {n}"), format!("http://streams/{n}"))
}

fn drain(events: &mut broadcast::Receiver<ProbeEvent>) -> Vec<ProbeEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

#[tokio::test(start_paused = true)]
async fn test_registry_holds_successes_in_completion_order() {
    let checker = ScriptedChecker::default()
        .with("http://streams/1", Script::Up(300))
        .with("http://streams/2", Script::Up(100))
        .with("http://streams/3", Script::Refused(50))
        .with("http://streams/4", Script::Up(200))
        .with("http://streams/5", Script::Status(503, 10));
    let prober = AvailabilityProber::new(Arc::new(checker), probe_config(Duration::from_secs(5)));

    let summary = prober.run((1..=5).map(channel).collect()).await;

    assert_eq!(summary.processed, 5);
    assert_eq!(summary.available, 3);
    assert_eq!(
        prober.registry().snapshot().await,
        vec![channel(2), channel(4), channel(1)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_timeouts_settle_as_failures() {
    let checker = ScriptedChecker::default()
        .with("http://streams/1", Script::Up(10))
        .with("http://streams/2", Script::Hang)
        .with("http://streams/3", Script::Up(2_000));
    let prober = AvailabilityProber::new(Arc::new(checker), probe_config(Duration::from_secs(1)));

    let summary = prober.run((1..=3).map(channel).collect()).await;

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.available, 1);
    assert_eq!(prober.registry().snapshot().await, vec![channel(1)]);
    assert_eq!(prober.reporter().latest(), ProbeProgress::completed(3, 1));
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_cadence_and_final_publish() {
    let mut checker = ScriptedChecker::default();
    for n in 1..=7 {
        checker = checker.with(&format!("http://streams/{n}"), Script::Up(n as u64 * 10));
    }
    let prober = AvailabilityProber::new(Arc::new(checker), probe_config(Duration::from_secs(5)));
    let mut events = prober.reporter().subscribe();

    prober.run((1..=7).map(channel).collect()).await;
    let events = drain(&mut events);

    let snapshot_sizes: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            ProbeEvent::Snapshot { channels, .. } => Some(channels.len()),
            _ => None,
        })
        .collect();
    assert_eq!(snapshot_sizes, vec![1, 5]);

    let progress_events = events
        .iter()
        .filter(|event| matches!(event, ProbeEvent::Progress { .. }))
        .count();
    assert_eq!(progress_events, 7);

    match events.last() {
        Some(ProbeEvent::Completed {
            progress, channels, ..
        }) => {
            assert_eq!(progress.percent, 100);
            assert_eq!(progress.available, 7);
            assert_eq!(channels.len(), 7);
        }
        other => panic!("expected a final completion event, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_second_run_replaces_previous_results() {
    let checker = ScriptedChecker::default()
        .with("http://streams/1", Script::Up(10))
        .with("http://streams/2", Script::Up(10))
        .with("http://streams/3", Script::Up(10));
    let prober = AvailabilityProber::new(Arc::new(checker), probe_config(Duration::from_secs(5)));

    prober.run(vec![channel(1), channel(2)]).await;
    assert_eq!(prober.registry().len().await, 2);

    let summary = prober.run(vec![channel(3)]).await;
    assert_eq!(summary.generation, 2);
    assert_eq!(prober.registry().snapshot().await, vec![channel(3)]);
}

#[tokio::test(start_paused = true)]
async fn test_new_run_supersedes_one_in_flight() {
    let checker = ScriptedChecker::default()
        .with("http://streams/1", Script::Up(10))
        .with("http://streams/2", Script::Up(10_000))
        .with("http://streams/3", Script::Up(50));
    let prober = Arc::new(AvailabilityProber::new(
        Arc::new(checker),
        probe_config(Duration::from_secs(30)),
    ));

    let first = {
        let prober = Arc::clone(&prober);
        tokio::spawn(async move { prober.run(vec![channel(1), channel(2)]).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(prober.registry().snapshot().await, vec![channel(1)]);

    let second = prober.run(vec![channel(3)]).await;
    let first = first.await.unwrap();

    assert!(first.superseded);
    assert!(!second.superseded);
    assert_eq!(prober.registry().snapshot().await, vec![channel(3)]);

    // Give any straggler from the first run time to land
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(prober.registry().snapshot().await, vec![channel(3)]);
    assert!(prober.registry().is_frozen().await);
}

#[tokio::test(start_paused = true)]
async fn test_empty_run_dispatches_nothing() {
    let checker = Arc::new(ScriptedChecker::default());
    let prober = AvailabilityProber::new(checker.clone(), probe_config(Duration::from_secs(5)));

    let summary = prober.run(Vec::new()).await;

    assert_eq!(summary.total, 0);
    assert_eq!(checker.calls.load(Ordering::SeqCst), 0);
    assert!(prober.registry().is_empty().await);
    assert_eq!(prober.reporter().latest().percent, 100);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_urls_both_survive() {
    let checker = ScriptedChecker::default().with("http://streams/1", Script::Up(10));
    let prober = AvailabilityProber::new(Arc::new(checker), probe_config(Duration::from_secs(5)));

    let summary = prober.run(vec![channel(1), channel(1)]).await;

    assert_eq!(summary.available, 2);
    assert_eq!(prober.registry().len().await, 2);
}
