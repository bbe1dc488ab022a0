//! Channel loading
//!
//! Entry points that start a probing run: from a playlist URL, from a configured
//! category, from local files, or from records the caller already parsed.

use std::sync::Arc;

use tracing::{info, warn};

use super::availability::AvailabilityProber;
use super::progress::ProgressReporter;
use super::registry::ChannelRegistry;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{ChannelRecord, ProbeRunSummary};
use crate::sources::{FilePlaylistFetcher, FormatSniffer, PlaylistFetcher, PlaylistParser};
use crate::utils::UrlUtils;

pub struct ChannelLoader {
    fetcher: Arc<dyn PlaylistFetcher>,
    file_fetcher: Arc<dyn PlaylistFetcher>,
    prober: Arc<AvailabilityProber>,
}

impl ChannelLoader {
    pub fn new(fetcher: Arc<dyn PlaylistFetcher>, prober: Arc<AvailabilityProber>) -> Self {
        Self {
            fetcher,
            file_fetcher: Arc::new(FilePlaylistFetcher),
            prober,
        }
    }

    pub fn with_file_fetcher(mut self, file_fetcher: Arc<dyn PlaylistFetcher>) -> Self {
        self.file_fetcher = file_fetcher;
        self
    }

    pub fn registry(&self) -> &ChannelRegistry {
        self.prober.registry()
    }

    pub fn reporter(&self) -> &ProgressReporter {
        self.prober.reporter()
    }

    /// Acquire and classify a playlist URL without probing it.
    ///
    /// An acquisition failure is not an error: the URL itself becomes a single
    /// fallback channel named after the slot it would take in the registry.
    pub async fn resolve_url(&self, url: &str) -> Vec<ChannelRecord> {
        match self.fetcher.fetch(url).await {
            Ok(source) => FormatSniffer::resolve(&source),
            Err(e) => {
                let position = self.registry().len().await + 1;
                warn!(
                    "Failed to fetch playlist {}: {}; probing it as a single channel",
                    UrlUtils::obfuscate_credentials(url),
                    e
                );
                vec![ChannelRecord::fallback(url, position)]
            }
        }
    }

    /// Fetch, classify and probe a playlist URL
    pub async fn load_url(&self, url: &str) -> ProbeRunSummary {
        let channels = self.resolve_url(url).await;
        info!(
            "Loaded {} channels from {}",
            channels.len(),
            UrlUtils::obfuscate_credentials(url)
        );
        self.load_records(channels).await
    }

    /// Probe records that were already parsed, bypassing format sniffing
    pub async fn load_records(&self, channels: Vec<ChannelRecord>) -> ProbeRunSummary {
        self.prober.run(channels).await
    }

    /// Read and probe one local playlist file.
    ///
    /// Manifest precedence applies, but a file without entries is not turned
    /// into a single stream; it simply yields no channels.
    pub async fn load_file(&self, path: &str) -> AppResult<ProbeRunSummary> {
        let source = self.file_fetcher.fetch(path).await?;
        let channels = PlaylistParser::parse_playlist(&source);
        info!("Loaded {} channels from file {}", channels.len(), source.origin);
        Ok(self.load_records(channels).await)
    }

    /// Load files one after another; each starts its own run.
    ///
    /// Unreadable files are logged and skipped. The registry ends up holding
    /// the last loaded file's channels.
    pub async fn load_files<P: AsRef<str>>(&self, paths: &[P]) -> Vec<ProbeRunSummary> {
        let mut summaries = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            match self.load_file(path).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!("Skipping playlist file {}: {}", path, e),
            }
        }
        summaries
    }

    /// Load a named category from the configuration
    pub async fn load_category(&self, config: &Config, name: &str) -> AppResult<ProbeRunSummary> {
        let category = config
            .category(name)
            .ok_or_else(|| AppError::validation(format!("Unknown category: {name}")))?;
        info!("Loading category {}", category.name);
        Ok(self.load_url(&category.url).await)
    }
}
