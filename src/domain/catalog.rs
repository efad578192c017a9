//! Typed records returned by the catalog API.
//!
//! Deserialized at the fetch boundary so the rest of the crate never walks
//! raw JSON. Only the fields the catalog export needs are modelled; unknown
//! fields are ignored and optional ones default to empty.

use serde::{Deserialize, Serialize};

use super::track::DatePrecision;

/// A full track object (`GET /tracks/{id}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub artists: Vec<ArtistRef>,

    /// Parent album (simplified)
    pub album: AlbumRef,

    #[serde(default)]
    pub external_ids: ExternalIds,

    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// A full album object (`GET /albums/{id}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub release_date: String,

    #[serde(default)]
    pub release_date_precision: Option<DatePrecision>,

    #[serde(default)]
    pub external_ids: ExternalIds,
}

/// Album as embedded in a track or listed under an artist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// `album`, `single`, `compilation` or `appears_on` (artist listings only)
    #[serde(default)]
    pub album_group: Option<String>,
}

/// Track as listed inside an album
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackRef {
    /// Missing for local or unavailable tracks
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,
}

/// Industry identifiers attached to tracks (ISRC) and albums (UPC)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalIds {
    #[serde(default)]
    pub isrc: Option<String>,

    #[serde(default)]
    pub upc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Offset to request next, `None` on the last page
    pub next_offset: Option<u32>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_offset: None,
        }
    }

    pub fn with_next(items: Vec<T>, next_offset: u32) -> Self {
        Self {
            items,
            next_offset: Some(next_offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_deserialization_ignores_extra_fields() {
        let json = r#"{
            "id": "t1",
            "name": "Song",
            "popularity": 42,
            "artists": [{"id": "a1", "name": "One"}, {"id": "a2", "name": "Two"}],
            "album": {"id": "al1", "name": "Record", "album_type": "album"},
            "external_ids": {"isrc": "GBAYE0601498"},
            "external_urls": {"spotify": "https://open.spotify.com/track/t1"}
        }"#;

        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.artists.len(), 2);
        assert_eq!(track.album.id, "al1");
        assert_eq!(track.external_ids.isrc.as_deref(), Some("GBAYE0601498"));
    }

    #[test]
    fn test_album_missing_ids_default_to_none() {
        let json = r#"{"id": "al1", "name": "Record", "release_date": "1999", "release_date_precision": "year"}"#;
        let album: Album = serde_json::from_str(json).unwrap();
        assert_eq!(album.release_date_precision, Some(DatePrecision::Year));
        assert!(album.external_ids.upc.is_none());
    }
}
