use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content type handed to the playback sink for every channel
pub const HLS_CONTENT_TYPE: &str = "application/x-mpegURL";

/// Display name used when an `#EXTINF` line carries no title
pub const UNNAMED_CHANNEL: &str = "Unnamed Channel";

/// Synthetic record values used when a source is a single stream
pub const LIVE_STREAM_NAME: &str = "Live Stream";
pub const LIVE_STREAM_GROUP: &str = "Live";
pub const LIVE_STREAM_ID: &str = "live-stream";

/// One playlist entry.
///
/// Optional metadata is stored as an empty string when absent, never as `None`,
/// so consumers can render it without unwrapping. `stream_url` is never empty:
/// entries without a resolvable URL are dropped by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub name: String,
    pub logo_url: String,
    pub stream_url: String,
    pub group: String,
    pub id: String,
}

impl ChannelRecord {
    pub fn new<N: Into<String>, U: Into<String>>(name: N, stream_url: U) -> Self {
        Self {
            name: name.into(),
            logo_url: String::new(),
            stream_url: stream_url.into(),
            group: String::new(),
            id: String::new(),
        }
    }

    pub fn with_logo<S: Into<String>>(mut self, logo_url: S) -> Self {
        self.logo_url = logo_url.into();
        self
    }

    pub fn with_group<S: Into<String>>(mut self, group: S) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = id.into();
        self
    }

    /// The single record emitted for a direct stream or an HLS manifest
    pub fn live_stream<U: Into<String>>(stream_url: U) -> Self {
        Self::new(LIVE_STREAM_NAME, stream_url)
            .with_group(LIVE_STREAM_GROUP)
            .with_id(LIVE_STREAM_ID)
    }

    /// Best-guess record for a source whose text could not be acquired.
    ///
    /// `position` is the 1-based slot the channel would take in the registry.
    pub fn fallback<U: Into<String>>(stream_url: U, position: usize) -> Self {
        Self::new(format!("Channel {position}"), stream_url)
    }

    pub fn has_logo(&self) -> bool {
        !self.logo_url.is_empty()
    }

    pub fn is_grouped(&self) -> bool {
        !self.group.is_empty()
    }

    pub fn has_external_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Raw playlist input: already-acquired text plus where it came from.
///
/// `origin` is a URL or file name. It is only used as the stream URL of
/// synthetic records and for logging, never for routing decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSource {
    pub text: String,
    pub origin: String,
}

impl PlaylistSource {
    pub fn new<T: Into<String>, O: Into<String>>(text: T, origin: O) -> Self {
        Self {
            text: text.into(),
            origin: origin.into(),
        }
    }
}

/// Classification of a playlist source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistKind {
    /// No channel entries at all, the source itself is the stream
    SingleStream,
    /// An HLS manifest; played as one stream even if it contains `#EXTINF`
    HlsManifest,
    /// A regular multi-channel M3U playlist
    MultiChannel,
}

/// How a single reachability check settled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ProbeStatus {
    /// Success status received
    Reachable { status: u16 },
    /// The server answered, but not with a success status
    Rejected { status: u16 },
    /// The probe timeout elapsed first
    TimedOut,
    /// The request failed before any status was received
    Failed { message: String },
}

impl ProbeStatus {
    pub fn from_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            Self::Reachable { status }
        } else {
            Self::Rejected { status }
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable { .. })
    }
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeStatus::Reachable { status } => write!(f, "reachable ({status})"),
            ProbeStatus::Rejected { status } => write!(f, "rejected ({status})"),
            ProbeStatus::TimedOut => write!(f, "timed out"),
            ProbeStatus::Failed { message } => write!(f, "failed: {message}"),
        }
    }
}

/// Result of probing one channel, produced exactly once per channel per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub channel: ChannelRecord,
    pub status: ProbeStatus,
}

impl ProbeOutcome {
    pub fn reachable(&self) -> bool {
        self.status.is_reachable()
    }
}

/// Progress tuple published to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProbeProgress {
    pub processed: usize,
    pub total: usize,
    pub available: usize,
    pub percent: u8,
}

impl ProbeProgress {
    pub fn new(processed: usize, total: usize, available: usize) -> Self {
        Self {
            processed,
            total,
            available,
            percent: percent_of(processed, total),
        }
    }

    /// Terminal progress; always reports 100%
    pub fn completed(total: usize, available: usize) -> Self {
        Self {
            processed: total,
            total,
            available,
            percent: 100,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.percent == 100 && self.processed == self.total
    }
}

/// `round(processed / total * 100)`, rounding halves up. An empty run is complete.
fn percent_of(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let processed = processed.min(total) as u128;
    let total = total as u128;
    ((processed * 200 + total) / (total * 2)) as u8
}

/// What a finished (or superseded) probing run looked like
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeRunSummary {
    pub generation: u64,
    pub total: usize,
    pub processed: usize,
    pub available: usize,
    /// A newer run started before this one finished; its results were discarded
    pub superseded: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Request handed to the playback sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    pub content_type: String,
    pub stream_url: String,
}

impl PlayRequest {
    pub fn for_channel(channel: &ChannelRecord) -> Self {
        Self {
            content_type: HLS_CONTENT_TYPE.to_string(),
            stream_url: channel.stream_url.clone(),
        }
    }
}
