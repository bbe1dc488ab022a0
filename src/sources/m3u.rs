//! M3U playlist parser
//!
//! Converts extended M3U text into an ordered list of [`ChannelRecord`]s. The
//! format is line oriented:
//!
//! ```text
//! #EXTM3U
//! #EXTINF:-1 tvg-id="news.uk" tvg-logo="http://logo/news.png" group-title="News",News 24
//! http://streams.example.com/news24.m3u8
//! ```
//!
//! Parsing is lossy on purpose. An `#EXTINF` line whose next line is missing,
//! blank or another `#` directive never becomes a record, and nothing is
//! reported for it beyond a debug log line.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::{ChannelRecord, PlaylistSource, UNNAMED_CHANNEL};
use crate::utils::url::UrlUtils;

/// Line prefix of a channel's metadata line
pub const EXTINF_MARKER: &str = "#EXTINF:";

/// Directive that marks the text as an HLS manifest rather than a channel list
pub const HLS_VERSION_MARKER: &str = "#EXT-X-VERSION";

static TVG_LOGO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"tvg-logo="([^"]+)""#).expect("valid tvg-logo pattern"));
static GROUP_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"group-title="([^"]+)""#).expect("valid group-title pattern"));
static TVG_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"tvg-id="([^"]+)""#).expect("valid tvg-id pattern"));

/// Stateless M3U parser
pub struct PlaylistParser;

impl PlaylistParser {
    /// Parse every `#EXTINF` + URL pair, in file order.
    pub fn parse(text: &str) -> Vec<ChannelRecord> {
        let lines: Vec<&str> = text.lines().collect();
        let mut channels = Vec::new();
        let mut dropped = 0usize;

        for (line_num, line) in lines.iter().enumerate() {
            if !line.starts_with(EXTINF_MARKER) {
                continue;
            }

            let stream_url = lines.get(line_num + 1).map(|next| next.trim()).unwrap_or("");
            if stream_url.is_empty() || stream_url.starts_with('#') {
                debug!(
                    "Dropping EXTINF entry at line {} without a stream URL",
                    line_num + 1
                );
                dropped += 1;
                continue;
            }

            channels.push(Self::parse_extinf_line(line, stream_url));
        }

        debug!(
            "Parsed {} channels ({} entries dropped)",
            channels.len(),
            dropped
        );
        channels
    }

    /// Parse a playlist that did not go through format sniffing.
    ///
    /// Manifest precedence still applies: an `#EXT-X-VERSION` directive anywhere
    /// turns the whole source into one live stream pointing at its origin.
    pub fn parse_playlist(source: &PlaylistSource) -> Vec<ChannelRecord> {
        if source.text.contains(HLS_VERSION_MARKER) {
            debug!(
                "Treating {} as a single HLS manifest",
                UrlUtils::obfuscate_credentials(&source.origin)
            );
            return vec![ChannelRecord::live_stream(source.origin.clone())];
        }
        Self::parse(&source.text)
    }

    /// Build a record from an `#EXTINF` line and the URL found below it.
    ///
    /// Format: `#EXTINF:<duration> [key="value" ...],<display name>`
    fn parse_extinf_line(line: &str, stream_url: &str) -> ChannelRecord {
        let extinf_content = line.strip_prefix(EXTINF_MARKER).unwrap_or(line);

        let name = title_offset(extinf_content)
            .map(|pos| extinf_content[pos + 1..].trim())
            .filter(|title| !title.is_empty())
            .unwrap_or(UNNAMED_CHANNEL);

        ChannelRecord::new(name, stream_url)
            .with_logo(capture_attribute(&TVG_LOGO, line))
            .with_group(capture_attribute(&GROUP_TITLE, line))
            .with_id(capture_attribute(&TVG_ID, line))
    }
}

/// Position of the comma that ends the duration/attribute section.
///
/// Commas inside quoted attribute values do not count.
fn title_offset(extinf_content: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (pos, ch) in extinf_content.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return Some(pos),
            _ => {}
        }
    }
    None
}

fn capture_attribute(pattern: &Regex, line: &str) -> String {
    pattern
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
