//! Probe progress reporting
//!
//! A read-side projection of the prober's counters. Consumers either subscribe to
//! the event stream or read the latest progress tuple from the watch channel; the
//! reporter itself keeps nothing beyond the last progress it was given.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::config::defaults::DEFAULT_EVENT_CAPACITY;
use crate::models::{ChannelRecord, ProbeProgress};

/// Event published while a probing run advances
#[derive(Debug, Clone)]
pub enum ProbeEvent {
    /// A run started; the registry has been cleared
    Started { generation: u64, total: usize },
    /// A probe settled
    Progress {
        generation: u64,
        progress: ProbeProgress,
    },
    /// Incremental registry snapshot (first available channel, then every Nth)
    Snapshot {
        generation: u64,
        progress: ProbeProgress,
        channels: Arc<Vec<ChannelRecord>>,
    },
    /// Every probe settled; `channels` is the final registry content
    Completed {
        generation: u64,
        progress: ProbeProgress,
        channels: Arc<Vec<ChannelRecord>>,
    },
}

impl ProbeEvent {
    pub fn generation(&self) -> u64 {
        match self {
            ProbeEvent::Started { generation, .. }
            | ProbeEvent::Progress { generation, .. }
            | ProbeEvent::Snapshot { generation, .. }
            | ProbeEvent::Completed { generation, .. } => *generation,
        }
    }

    pub fn progress(&self) -> ProbeProgress {
        match self {
            ProbeEvent::Started { total, .. } => ProbeProgress::new(0, *total, 0),
            ProbeEvent::Progress { progress, .. }
            | ProbeEvent::Snapshot { progress, .. }
            | ProbeEvent::Completed { progress, .. } => *progress,
        }
    }
}

#[derive(Clone)]
pub struct ProgressReporter {
    event_tx: broadcast::Sender<ProbeEvent>,
    latest_tx: Arc<watch::Sender<ProbeProgress>>,
}

impl ProgressReporter {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        let (latest_tx, _) = watch::channel(ProbeProgress::default());
        Self {
            event_tx,
            latest_tx: Arc::new(latest_tx),
        }
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ProbeEvent> {
        self.event_tx.subscribe()
    }

    /// Watch the latest progress tuple
    pub fn watch(&self) -> watch::Receiver<ProbeProgress> {
        self.latest_tx.subscribe()
    }

    pub fn latest(&self) -> ProbeProgress {
        *self.latest_tx.borrow()
    }

    pub(crate) fn started(&self, generation: u64, total: usize) {
        self.publish(ProbeEvent::Started { generation, total });
    }

    pub(crate) fn report(&self, generation: u64, progress: ProbeProgress) {
        self.publish(ProbeEvent::Progress {
            generation,
            progress,
        });
    }

    pub(crate) fn publish_snapshot(
        &self,
        generation: u64,
        progress: ProbeProgress,
        channels: Arc<Vec<ChannelRecord>>,
    ) {
        self.publish(ProbeEvent::Snapshot {
            generation,
            progress,
            channels,
        });
    }

    pub(crate) fn complete(
        &self,
        generation: u64,
        progress: ProbeProgress,
        channels: Arc<Vec<ChannelRecord>>,
    ) {
        self.publish(ProbeEvent::Completed {
            generation,
            progress,
            channels,
        });
    }

    fn publish(&self, event: ProbeEvent) {
        self.latest_tx.send_replace(event.progress());
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
