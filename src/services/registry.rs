//! Channel registry
//!
//! The authoritative set of channels confirmed reachable in the current run.
//! Only the availability prober mutates it; everything else reads snapshots.
//!
//! Each run is tagged with a generation. Resetting to a new generation clears the
//! previous run's channels, and writes tagged with an older generation are
//! rejected, so a late probe result from a superseded run can never leak into
//! the next one.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::ChannelRecord;

#[derive(Debug, Default)]
struct RegistryState {
    generation: u64,
    channels: Vec<ChannelRecord>,
    frozen: bool,
}

/// Shared handle to the registry; clones observe the same state
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the registry and start accepting writes for `generation`.
    ///
    /// Returns false, leaving the registry untouched, if a newer generation
    /// already owns it.
    pub(crate) async fn reset(&self, generation: u64) -> bool {
        let mut state = self.state.write().await;
        if generation < state.generation {
            return false;
        }
        debug!(
            "Resetting channel registry: generation {} -> {} ({} stale channels cleared)",
            state.generation,
            generation,
            state.channels.len()
        );
        state.generation = generation;
        state.channels.clear();
        state.frozen = false;
        true
    }

    /// Append a channel in completion order. No deduplication is performed.
    pub(crate) async fn append(&self, generation: u64, channel: ChannelRecord) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation || state.frozen {
            return false;
        }
        state.channels.push(channel);
        true
    }

    /// Mark the run as finished; the registry is read-only until the next reset.
    pub(crate) async fn freeze(&self, generation: u64) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        state.frozen = true;
        true
    }

    /// Copy of the current channels, in the order their probes succeeded
    pub async fn snapshot(&self) -> Vec<ChannelRecord> {
        self.state.read().await.channels.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.channels.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    pub async fn is_frozen(&self) -> bool {
        self.state.read().await.frozen
    }
}
