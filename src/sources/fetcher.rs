//! Playlist acquisition over HTTP and from local files

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::traits::PlaylistFetcher;
use crate::config::PlaylistConfig;
use crate::errors::{AppResult, SourceError, SourceResult};
use crate::models::PlaylistSource;
use crate::utils::StandardHttpClient;

/// Fetches playlists over HTTP(S)
pub struct HttpPlaylistFetcher {
    http_client: StandardHttpClient,
}

impl HttpPlaylistFetcher {
    pub fn new(config: &PlaylistConfig) -> AppResult<Self> {
        let http_client = StandardHttpClient::with_timeout(config.fetch_timeout, &config.user_agent)?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl PlaylistFetcher for HttpPlaylistFetcher {
    async fn fetch(&self, location: &str) -> SourceResult<PlaylistSource> {
        let text = self.http_client.fetch_text(location).await?;
        Ok(PlaylistSource::new(text, location))
    }
}

/// Reads playlists from the local filesystem.
///
/// The origin of the resulting source is the file name, not the full path.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilePlaylistFetcher;

#[async_trait]
impl PlaylistFetcher for FilePlaylistFetcher {
    async fn fetch(&self, location: &str) -> SourceResult<PlaylistSource> {
        let path = Path::new(location);
        let bytes = tokio::fs::read(path).await.map_err(|e| SourceError::File {
            path: location.to_string(),
            message: e.to_string(),
        })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let origin = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| location.to_string());

        debug!("Read {} bytes from playlist file {}", bytes.len(), location);
        Ok(PlaylistSource::new(text, origin))
    }
}
