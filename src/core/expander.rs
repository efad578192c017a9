//! Expansion of classified references into track ids.
//!
//! - track: the id itself
//! - album: every track on every page of the album listing
//! - artist: every album (of the configured groups) the artist published,
//!   each expanded like an album
//!
//! An album reached twice in one run is only expanded the first time. A
//! failed listing yields no tracks for that album and never stops the rest of
//! the run.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::adapters::{CatalogApi, FetchError};
use crate::domain::{ClassifiedReference, ReferenceKind};
use crate::pacing::Throttle;

/// Counters gathered while expanding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    /// Albums whose track listing was fetched completely
    pub collections_expanded: usize,

    /// Albums skipped because an earlier path already expanded them
    pub collections_skipped: usize,

    /// Albums or artists whose listing failed
    pub listings_failed: usize,
}

/// Turns references into flat track id lists
pub struct Expander<'a> {
    api: &'a dyn CatalogApi,
    throttle: Throttle,
}

impl<'a> Expander<'a> {
    pub fn new(api: &'a dyn CatalogApi, throttle: Throttle) -> Self {
        Self { api, throttle }
    }

    /// Expand one reference; `processed` holds album ids already expanded
    pub async fn expand(
        &self,
        reference: &ClassifiedReference,
        processed: &mut HashSet<String>,
        stats: &mut ExpansionStats,
    ) -> Vec<String> {
        match reference.kind {
            ReferenceKind::Track => vec![reference.id.clone()],
            ReferenceKind::Album => self.expand_album(&reference.id, processed, stats).await,
            ReferenceKind::Artist => self.expand_artist(&reference.id, processed, stats).await,
        }
    }

    async fn expand_artist(
        &self,
        artist_id: &str,
        processed: &mut HashSet<String>,
        stats: &mut ExpansionStats,
    ) -> Vec<String> {
        let album_ids = match self.artist_album_ids(artist_id).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(artist_id, error = %e, "Failed to list artist albums");
                stats.listings_failed += 1;
                return Vec::new();
            }
        };

        info!(artist_id, albums = album_ids.len(), "Artist albums listed");

        let mut track_ids = Vec::new();
        for (i, album_id) in album_ids.iter().enumerate() {
            if processed.contains(album_id) {
                debug!(album_id, "Album already expanded, skipping");
                stats.collections_skipped += 1;
                continue;
            }

            debug!(artist_id, album_id, position = i + 1, total = album_ids.len(), "Expanding artist album");
            track_ids.extend(self.expand_album(album_id, processed, stats).await);
            self.throttle.pause().await;
        }

        track_ids
    }

    async fn expand_album(
        &self,
        album_id: &str,
        processed: &mut HashSet<String>,
        stats: &mut ExpansionStats,
    ) -> Vec<String> {
        if processed.contains(album_id) {
            debug!(album_id, "Album already expanded, skipping");
            stats.collections_skipped += 1;
            return Vec::new();
        }

        match self.album_track_ids(album_id).await {
            Ok(ids) => {
                info!(album_id, tracks = ids.len(), "Album tracks listed");
                processed.insert(album_id.to_string());
                stats.collections_expanded += 1;
                ids
            }
            Err(e) => {
                warn!(album_id, error = %e, "Failed to list album tracks");
                stats.listings_failed += 1;
                Vec::new()
            }
        }
    }

    /// All track ids of an album, following pagination
    pub async fn album_track_ids(&self, album_id: &str) -> Result<Vec<String>, FetchError> {
        let mut ids = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.api.album_tracks(album_id, offset).await?;
            // Local or unavailable tracks carry no id
            ids.extend(page.items.into_iter().filter_map(|t| t.id));

            match page.next_offset {
                Some(next) => {
                    offset = next;
                    self.throttle.pause().await;
                }
                None => break,
            }
        }

        Ok(ids)
    }

    /// All album ids of an artist, following pagination
    pub async fn artist_album_ids(&self, artist_id: &str) -> Result<Vec<String>, FetchError> {
        let mut ids = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.api.artist_albums(artist_id, offset).await?;
            ids.extend(page.items.into_iter().map(|a| a.id));

            match page.next_offset {
                Some(next) => {
                    offset = next;
                    self.throttle.pause().await;
                }
                None => break,
            }
        }

        Ok(ids)
    }
}
