//! Track detail lookup and normalization into catalog rows.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::adapters::{CatalogApi, FetchError};
use crate::domain::{normalize_release_date, Album, Track, TrackRecord};

/// Fetches a track and its album and flattens them into one row.
///
/// Album lookups are memoized for the lifetime of the fetcher (one run), so
/// the tracks of one album cost a single album request between them.
pub struct DetailFetcher<'a> {
    api: &'a dyn CatalogApi,
    albums: HashMap<String, Album>,
}

impl<'a> DetailFetcher<'a> {
    pub fn new(api: &'a dyn CatalogApi) -> Self {
        Self {
            api,
            albums: HashMap::new(),
        }
    }

    /// Build the row for `track_id`.
    ///
    /// `Ok(None)` when the track or its album does not exist; `Err` when a
    /// request failed.
    pub async fn fetch(&mut self, track_id: &str) -> Result<Option<TrackRecord>, FetchError> {
        let track = match self.api.track(track_id).await? {
            Some(track) => track,
            None => {
                warn!(track_id, "Track not found");
                return Ok(None);
            }
        };

        let album = match self.album(&track.album.id).await? {
            Some(album) => album,
            None => {
                warn!(track_id, album_id = %track.album.id, "Album of track not found");
                return Ok(None);
            }
        };

        Ok(Some(build_record(&track, album)))
    }

    async fn album(&mut self, album_id: &str) -> Result<Option<&Album>, FetchError> {
        if !self.albums.contains_key(album_id) {
            match self.api.album(album_id).await? {
                Some(album) => {
                    debug!(album_id, "Album metadata cached");
                    self.albums.insert(album_id.to_string(), album);
                }
                None => return Ok(None),
            }
        }
        Ok(self.albums.get(album_id))
    }
}

/// Flatten a track and its album into a catalog row
pub fn build_record(track: &Track, album: &Album) -> TrackRecord {
    let artist = track
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let album_name = if track.album.name.is_empty() {
        album.name.clone()
    } else {
        track.album.name.clone()
    };

    TrackRecord {
        artist,
        title: track.name.clone(),
        release_date: normalize_release_date(&album.release_date, album.release_date_precision),
        album: album_name,
        upc: album.external_ids.upc.clone().unwrap_or_default(),
        isrc: track.external_ids.isrc.clone().unwrap_or_default(),
        spotify_link: track.external_urls.spotify.clone().unwrap_or_default(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlbumRef, ArtistRef, DatePrecision, ExternalIds, ExternalUrls};

    fn track() -> Track {
        Track {
            id: "t1".to_string(),
            name: "Song".to_string(),
            artists: vec![
                ArtistRef {
                    id: None,
                    name: "One".to_string(),
                },
                ArtistRef {
                    id: None,
                    name: "Two".to_string(),
                },
            ],
            album: AlbumRef {
                id: "al1".to_string(),
                name: "Record".to_string(),
                album_group: None,
            },
            external_ids: ExternalIds {
                isrc: Some("ISRC1".to_string()),
                upc: None,
            },
            external_urls: ExternalUrls {
                spotify: Some("https://open.spotify.com/track/t1".to_string()),
            },
        }
    }

    fn album(date: &str, precision: DatePrecision) -> Album {
        Album {
            id: "al1".to_string(),
            name: "Record".to_string(),
            release_date: date.to_string(),
            release_date_precision: Some(precision),
            external_ids: ExternalIds {
                isrc: None,
                upc: Some("0602537351238".to_string()),
            },
        }
    }

    #[test]
    fn test_build_record() {
        let record = build_record(&track(), &album("2020-05", DatePrecision::Month));

        assert_eq!(record.artist, "One, Two");
        assert_eq!(record.title, "Song");
        assert_eq!(record.release_date, "2020-05-01");
        assert_eq!(record.album, "Record");
        assert_eq!(record.upc, "0602537351238");
        assert_eq!(record.isrc, "ISRC1");
        assert_eq!(record.spotify_link, "https://open.spotify.com/track/t1");
        assert_eq!(record.production_credit, "");
        assert_eq!(record.apple_music_link, "");
    }

    #[test]
    fn test_missing_codes_are_empty() {
        let mut t = track();
        t.external_ids.isrc = None;
        t.external_urls.spotify = None;
        let mut a = album("1999", DatePrecision::Year);
        a.external_ids.upc = None;

        let record = build_record(&t, &a);
        assert_eq!(record.isrc, "");
        assert_eq!(record.upc, "");
        assert_eq!(record.spotify_link, "");
        assert_eq!(record.release_date, "1999-01-01");
    }
}
