//! Playlist sources
//!
//! Acquisition of raw playlist text, format sniffing and M3U parsing.

pub mod fetcher;
pub mod m3u;
pub mod sniffer;
pub mod traits;

pub use fetcher::{FilePlaylistFetcher, HttpPlaylistFetcher};
pub use m3u::PlaylistParser;
pub use sniffer::FormatSniffer;
pub use traits::PlaylistFetcher;
