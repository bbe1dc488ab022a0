/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
use std::time::Duration;

// Config file defaults
pub const DEFAULT_CONFIG_FILE: &str = "m3u-probe.toml";
pub const CONFIG_FILE_ENV: &str = "M3U_PROBE_CONFIG";

// Probe defaults
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 64;
pub const DEFAULT_PUBLISH_EVERY: usize = 5;

// Playlist acquisition defaults
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("m3u-probe/", env!("CARGO_PKG_VERSION"));

// Playback defaults
pub const DEFAULT_PLAYER_COMMAND: &str = "mpv";

// Event channel capacity for progress subscribers
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;
