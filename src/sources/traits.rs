//! Source trait definitions
//!
//! Acquisition of raw playlist text is kept behind a trait so the loader can be
//! driven by HTTP, the local filesystem or an in-memory fake in tests.

use async_trait::async_trait;

use crate::errors::SourceResult;
use crate::models::PlaylistSource;

/// Acquires the raw text of a playlist
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    /// Fetch the playlist at `location` (a URL or a path, depending on the fetcher)
    async fn fetch(&self, location: &str) -> SourceResult<PlaylistSource>;
}
