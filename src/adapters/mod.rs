//! Adapter interfaces for external services.
//!
//! Two upstreams are involved in building a catalog:
//! - the Spotify Web API, which resolves ids to metadata
//! - the song.link API, which maps a Spotify link to other platforms
//!
//! The core only talks to the traits below so it can be driven by
//! in-memory fakes in tests.

pub mod songlink;
pub mod spotify;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Album, AlbumRef, Page, Track, TrackRef};

// Re-export the concrete clients
pub use songlink::SonglinkClient;
pub use spotify::SpotifyClient;

/// Errors raised at the fetch boundary
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Authentication rejected: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Still rate limited after {attempts} attempts: {url}")]
    RateLimited { attempts: u32, url: String },

    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only access to the music catalog.
///
/// Single lookups return `Ok(None)` when the id does not exist, so callers
/// can tell a missing record from a failed request. Listings are paginated
/// by offset; callers follow `Page::next_offset` until it is `None`.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one track
    async fn track(&self, id: &str) -> Result<Option<Track>, FetchError>;

    /// Fetch one album
    async fn album(&self, id: &str) -> Result<Option<Album>, FetchError>;

    /// One page of an album's track listing
    async fn album_tracks(&self, album_id: &str, offset: u32) -> Result<Page<TrackRef>, FetchError>;

    /// One page of an artist's albums, filtered by the configured album groups
    async fn artist_albums(&self, artist_id: &str, offset: u32)
        -> Result<Page<AlbumRef>, FetchError>;
}

/// Maps a link on one platform to the equivalent link on another
#[async_trait]
pub trait LinkResolver: Send + Sync {
    /// Human-readable resolver name
    fn name(&self) -> &str;

    /// Resolve `source_link`; `Ok(None)` when the target platform has no match
    async fn resolve(&self, source_link: &str) -> Result<Option<String>, FetchError>;
}
