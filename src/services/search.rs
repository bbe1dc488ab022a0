//! Channel search
//!
//! Case-insensitive substring filtering over registry snapshots.

use crate::models::ChannelRecord;

#[derive(Debug, Clone, Default)]
pub struct ChannelFilter {
    term: String,
}

impl ChannelFilter {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    /// Whether the term occurs in the channel's name, group, stream URL or logo URL
    pub fn matches(&self, channel: &ChannelRecord) -> bool {
        if self.term.is_empty() {
            return true;
        }
        [
            &channel.name,
            &channel.group,
            &channel.stream_url,
            &channel.logo_url,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&self.term))
    }

    /// Keep matching channels, preserving snapshot order
    pub fn apply(&self, channels: &[ChannelRecord]) -> Vec<ChannelRecord> {
        channels
            .iter()
            .filter(|channel| self.matches(channel))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn snapshot() -> Vec<ChannelRecord> {
        vec![
            ChannelRecord::new("BBC One", "http://cdn/bbc1.m3u8").with_group("UK"),
            ChannelRecord::new("Arte", "http://cdn/arte.m3u8")
                .with_group("Europe")
                .with_logo("http://img/arte.png"),
            ChannelRecord::new("CNN", "http://news.example/cnn"),
        ]
    }

    #[rstest]
    #[case("bbc", vec!["BBC One"])]
    #[case("EUROPE", vec!["Arte"])]
    #[case("news.example", vec!["CNN"])]
    #[case("arte.png", vec!["Arte"])]
    #[case("cdn", vec!["BBC One", "Arte"])]
    #[case("nothing", vec![])]
    fn test_matches_any_field(#[case] term: &str, #[case] expected: Vec<&str>) {
        let names: Vec<_> = ChannelFilter::new(term)
            .apply(&snapshot())
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_empty_term_returns_everything() {
        let filter = ChannelFilter::new("   ");
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&snapshot()), snapshot());
    }
}
