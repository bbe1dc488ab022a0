//! Availability prober
//!
//! Fans out one reachability probe per channel and aggregates the outcomes into
//! the [`ChannelRegistry`], publishing progress as probes settle.
//!
//! Probe tasks never touch the registry. Each one sends its [`ProbeOutcome`]
//! over an mpsc channel to the aggregation loop in [`AvailabilityProber::run`],
//! which is the registry's only writer and owns the counters. Registry order is
//! therefore completion order, not playlist order.
//!
//! Fan-out is bounded by `probe.max_concurrent` permits. With `0` every channel
//! is dispatched at once, which does not scale to very large playlists.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::progress::ProgressReporter;
use super::reachability::ReachabilityCheck;
use super::registry::ChannelRegistry;
use crate::config::ProbeConfig;
use crate::models::{ChannelRecord, ProbeOutcome, ProbeProgress, ProbeRunSummary, ProbeStatus};
use crate::utils::UrlUtils;

pub struct AvailabilityProber {
    checker: Arc<dyn ReachabilityCheck>,
    registry: ChannelRegistry,
    reporter: ProgressReporter,
    config: ProbeConfig,
    generation: AtomicU64,
    current_token: std::sync::Mutex<Option<CancellationToken>>,
}

impl AvailabilityProber {
    pub fn new(checker: Arc<dyn ReachabilityCheck>, config: ProbeConfig) -> Self {
        Self::with_parts(
            checker,
            ChannelRegistry::new(),
            ProgressReporter::default(),
            config,
        )
    }

    pub fn with_parts(
        checker: Arc<dyn ReachabilityCheck>,
        registry: ChannelRegistry,
        reporter: ProgressReporter,
        config: ProbeConfig,
    ) -> Self {
        Self {
            checker,
            registry,
            reporter,
            config,
            generation: AtomicU64::new(0),
            current_token: std::sync::Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    /// Abort the run in progress, if any. Its results are discarded.
    pub fn cancel(&self) {
        if let Some(token) = self.lock_token().as_ref() {
            token.cancel();
        }
    }

    /// Probe `channels` and rebuild the registry from the reachable ones.
    ///
    /// Starting a run supersedes any run still in flight on this prober: its
    /// probes are cancelled and its late results are ignored.
    pub async fn run(&self, channels: Vec<ChannelRecord>) -> ProbeRunSummary {
        let started_at = Utc::now();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = self.begin_run();
        // Cancel our own probes if the caller drops this future
        let _guard = token.clone().drop_guard();
        let total = channels.len();

        if !self.registry.reset(generation).await {
            return superseded(generation, total, 0, 0, started_at);
        }
        self.reporter.started(generation, total);

        if total == 0 {
            info!("Run {}: no channels to probe", generation);
            self.registry.freeze(generation).await;
            self.reporter
                .complete(generation, ProbeProgress::completed(0, 0), Arc::new(Vec::new()));
            return ProbeRunSummary {
                generation,
                total,
                processed: 0,
                available: 0,
                superseded: false,
                started_at,
                finished_at: Utc::now(),
            };
        }

        info!(
            "Run {}: probing {} channels (timeout {:?}, concurrency {})",
            generation,
            total,
            self.config.timeout,
            concurrency_label(self.config.max_concurrent)
        );

        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        tokio::spawn(dispatch(
            channels,
            Arc::clone(&self.checker),
            self.config.timeout,
            limiter(self.config.max_concurrent),
            token.clone(),
            outcome_tx,
        ));

        let publish_every = self.config.publish_every.max(1);
        let mut processed = 0usize;
        let mut available = 0usize;

        while processed < total {
            let outcome: ProbeOutcome = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    return superseded(generation, total, processed, available, started_at);
                }
                outcome = outcome_rx.recv() => match outcome {
                    Some(outcome) => outcome,
                    None => break,
                },
            };

            processed += 1;
            let reachable = outcome.reachable();
            if reachable {
                if !self.registry.append(generation, outcome.channel).await {
                    return superseded(generation, total, processed, available, started_at);
                }
                available += 1;
            } else {
                warn!(
                    "Channel {} check failed: {} ({})",
                    outcome.channel.name,
                    outcome.status,
                    UrlUtils::obfuscate_credentials(&outcome.channel.stream_url)
                );
            }

            let progress = ProbeProgress::new(processed, total, available);
            self.reporter.report(generation, progress);

            if reachable && (available == 1 || available % publish_every == 0) {
                let snapshot = Arc::new(self.registry.snapshot().await);
                debug!(
                    "Run {}: publishing snapshot of {} channels at {}%",
                    generation,
                    snapshot.len(),
                    progress.percent
                );
                self.reporter.publish_snapshot(generation, progress, snapshot);
            }
        }

        if processed < total {
            // A probe task died without reporting; count it as unreachable
            warn!(
                "Run {}: {} probes ended without an outcome",
                generation,
                total - processed
            );
        }

        if token.is_cancelled() || !self.registry.freeze(generation).await {
            return superseded(generation, total, processed, available, started_at);
        }

        let channels = Arc::new(self.registry.snapshot().await);
        let progress = ProbeProgress::completed(total, channels.len());
        self.reporter.complete(generation, progress, channels);

        info!(
            "Run {}: {} of {} channels available",
            generation, available, total
        );

        ProbeRunSummary {
            generation,
            total,
            processed: total,
            available,
            superseded: false,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Cancel the previous run's token and install a fresh one
    fn begin_run(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.lock_token().replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    fn lock_token(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.current_token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn limiter(max_concurrent: usize) -> Option<Arc<Semaphore>> {
    (max_concurrent > 0).then(|| Arc::new(Semaphore::new(max_concurrent)))
}

fn concurrency_label(max_concurrent: usize) -> String {
    if max_concurrent == 0 {
        "unbounded".to_string()
    } else {
        max_concurrent.to_string()
    }
}

fn superseded(
    generation: u64,
    total: usize,
    processed: usize,
    available: usize,
    started_at: DateTime<Utc>,
) -> ProbeRunSummary {
    info!(
        "Run {}: superseded after {}/{} probes, results discarded",
        generation, processed, total
    );
    ProbeRunSummary {
        generation,
        total,
        processed,
        available,
        superseded: true,
        started_at,
        finished_at: Utc::now(),
    }
}

/// Spawn one probe per channel, waiting for a permit first when bounded
async fn dispatch(
    channels: Vec<ChannelRecord>,
    checker: Arc<dyn ReachabilityCheck>,
    timeout: Duration,
    limiter: Option<Arc<Semaphore>>,
    token: CancellationToken,
    outcome_tx: mpsc::UnboundedSender<ProbeOutcome>,
) {
    for channel in channels {
        let permit = match &limiter {
            Some(semaphore) => {
                let acquired = tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    permit = Arc::clone(semaphore).acquire_owned() => permit,
                };
                match acquired {
                    Ok(permit) => Some(permit),
                    Err(_) => return,
                }
            }
            None => None,
        };

        let checker = Arc::clone(&checker);
        let token = token.clone();
        let outcome_tx = outcome_tx.clone();
        tokio::spawn(async move {
            let _permit = permit;
            if let Some(outcome) = probe(checker.as_ref(), channel, timeout, &token).await {
                let _ = outcome_tx.send(outcome);
            }
        });
    }
}

/// Race one check against the timeout. `None` when the run was cancelled.
async fn probe(
    checker: &dyn ReachabilityCheck,
    channel: ChannelRecord,
    timeout: Duration,
    token: &CancellationToken,
) -> Option<ProbeOutcome> {
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => return None,
        result = tokio::time::timeout(timeout, checker.check(&channel.stream_url)) => result,
    };

    let status = match result {
        Ok(Ok(status)) => ProbeStatus::from_status(status),
        Ok(Err(e)) => ProbeStatus::Failed {
            message: e.to_string(),
        },
        Err(_) => ProbeStatus::TimedOut,
    };
    debug!("Probed {}: {}", channel.name, status);

    Some(ProbeOutcome { channel, status })
}
