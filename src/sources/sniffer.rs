//! Playlist format sniffing
//!
//! Decides, before any parsing, whether a source is a direct stream, an HLS
//! manifest or a real multi-channel playlist.

use tracing::debug;

use super::m3u::{EXTINF_MARKER, HLS_VERSION_MARKER, PlaylistParser};
use crate::models::{ChannelRecord, PlaylistKind, PlaylistSource};
use crate::utils::url::UrlUtils;

pub struct FormatSniffer;

impl FormatSniffer {
    /// Classify a source by the markers in its text.
    ///
    /// No `#EXTINF:` at all means the source is a stream. Otherwise an
    /// `#EXT-X-VERSION` anywhere wins over every channel entry.
    pub fn classify(source: &PlaylistSource) -> PlaylistKind {
        if !source.text.contains(EXTINF_MARKER) {
            PlaylistKind::SingleStream
        } else if source.text.contains(HLS_VERSION_MARKER) {
            PlaylistKind::HlsManifest
        } else {
            PlaylistKind::MultiChannel
        }
    }

    /// Turn a source into the channel records it describes.
    pub fn resolve(source: &PlaylistSource) -> Vec<ChannelRecord> {
        let kind = Self::classify(source);
        debug!(
            "Classified {} as {:?}",
            UrlUtils::obfuscate_credentials(&source.origin),
            kind
        );

        match kind {
            PlaylistKind::SingleStream | PlaylistKind::HlsManifest => {
                vec![ChannelRecord::live_stream(source.origin.clone())]
            }
            PlaylistKind::MultiChannel => PlaylistParser::parse(&source.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "http://example.com/playlist.m3u";

    #[test]
    fn test_text_without_entries_is_a_single_stream() {
        let source = PlaylistSource::new("\u{0}\u{1}binary-ish transport stream bytes", ORIGIN);
        assert_eq!(FormatSniffer::classify(&source), PlaylistKind::SingleStream);

        let channels = FormatSniffer::resolve(&source);
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].stream_url, ORIGIN);
        assert_eq!(channels[0].group, "Live");
    }

    #[test]
    fn test_manifest_marker_wins_over_entries() {
        let source = PlaylistSource::new(
            "#EXTM3U\n#EXTINF:-1,One\nhttp://x/1\n#EXT-X-VERSION:3\n#EXTINF:-1,Two\nhttp://x/2\n",
            ORIGIN,
        );
        assert_eq!(FormatSniffer::classify(&source), PlaylistKind::HlsManifest);

        let channels = FormatSniffer::resolve(&source);
        assert_eq!(channels, vec![ChannelRecord::live_stream(ORIGIN)]);
        assert_eq!(channels[0].name, "Live Stream");
    }

    #[test]
    fn test_version_marker_without_entries_is_a_single_stream() {
        // A master playlist has no #EXTINF lines at all
        let source = PlaylistSource::new(
            "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-STREAM-INF:BANDWIDTH=800000\nlow.m3u8\n",
            ORIGIN,
        );
        assert_eq!(FormatSniffer::classify(&source), PlaylistKind::SingleStream);
        assert_eq!(FormatSniffer::resolve(&source)[0].stream_url, ORIGIN);
    }

    #[test]
    fn test_multi_channel_delegates_to_parser() {
        let source = PlaylistSource::new(
            "#EXTM3U\n#EXTINF:-1,One\nhttp://x/1\n#EXTINF:-1,Two\nhttp://x/2\n",
            ORIGIN,
        );
        assert_eq!(FormatSniffer::classify(&source), PlaylistKind::MultiChannel);

        let urls: Vec<String> = FormatSniffer::resolve(&source)
            .into_iter()
            .map(|c| c.stream_url)
            .collect();
        assert_eq!(urls, vec!["http://x/1", "http://x/2"]);
    }
}
