//! Service layer
//!
//! Orchestrates a probing run: loading channels, probing their availability,
//! keeping the registry of reachable channels and reporting progress. Search and
//! playback operate on the registry snapshots the run produces.

pub mod availability;
pub mod channel_loader;
pub mod playback;
pub mod progress;
pub mod reachability;
pub mod registry;
pub mod search;

pub use availability::AvailabilityProber;
pub use channel_loader::ChannelLoader;
pub use playback::{CommandPlaybackSink, LoggingPlaybackSink, PlaybackSink};
pub use progress::{ProbeEvent, ProgressReporter};
pub use reachability::{HttpReachabilityChecker, ReachabilityCheck};
pub use registry::ChannelRegistry;
pub use search::ChannelFilter;
