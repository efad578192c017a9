//! Aggregation Integration Tests
//!
//! Drives the full generate flow (classify, expand, fetch, deduplicate,
//! encode) against an in-memory catalog.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use spotify_catalog::adapters::{CatalogApi, FetchError};
use spotify_catalog::config::{Credentials, ResolvedConfig};
use spotify_catalog::core::{generate_with, GenerateError, GenerateOutcome};
use spotify_catalog::domain::{
    Album, AlbumRef, ArtistRef, DatePrecision, ExternalIds, ExternalUrls, Page, Track, TrackRef,
};
use spotify_catalog::export::workbook;

/// In-memory catalog that records every call it receives
#[derive(Default)]
struct FakeCatalog {
    tracks: HashMap<String, Track>,
    albums: HashMap<String, Album>,
    /// Album id -> pages of track ids
    listings: HashMap<String, Vec<Vec<String>>>,
    /// Artist id -> pages of album ids
    discographies: HashMap<String, Vec<Vec<String>>>,
    /// Ids whose lookups fail with a transport-level error
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    fn new() -> Self {
        Self::default()
    }

    fn with_album(mut self, id: &str, name: &str, release_date: &str, upc: &str) -> Self {
        self.albums.insert(
            id.to_string(),
            Album {
                id: id.to_string(),
                name: name.to_string(),
                release_date: release_date.to_string(),
                release_date_precision: Some(DatePrecision::Day),
                external_ids: ExternalIds {
                    isrc: None,
                    upc: Some(upc.to_string()),
                },
            },
        );
        self
    }

    fn with_track(mut self, id: &str, title: &str, artists: &[&str], album_id: &str, isrc: &str) -> Self {
        let album_name = self
            .albums
            .get(album_id)
            .map(|a| a.name.clone())
            .unwrap_or_default();

        self.tracks.insert(
            id.to_string(),
            Track {
                id: id.to_string(),
                name: title.to_string(),
                artists: artists
                    .iter()
                    .map(|name| ArtistRef {
                        id: None,
                        name: name.to_string(),
                    })
                    .collect(),
                album: AlbumRef {
                    id: album_id.to_string(),
                    name: album_name,
                    album_group: None,
                },
                external_ids: ExternalIds {
                    isrc: (!isrc.is_empty()).then(|| isrc.to_string()),
                    upc: None,
                },
                external_urls: ExternalUrls {
                    spotify: Some(format!("https://open.spotify.com/track/{}", id)),
                },
            },
        );
        self
    }

    fn with_listing(mut self, album_id: &str, pages: &[&[&str]]) -> Self {
        self.listings.insert(album_id.to_string(), to_pages(pages));
        self
    }

    fn with_discography(mut self, artist_id: &str, pages: &[&[&str]]) -> Self {
        self.discographies.insert(artist_id.to_string(), to_pages(pages));
        self
    }

    fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn check(&self, id: &str) -> Result<(), FetchError> {
        if self.failing.contains(id) {
            return Err(FetchError::Status {
                status: 500,
                url: format!("fake://{}", id),
            });
        }
        Ok(())
    }
}

fn to_pages(pages: &[&[&str]]) -> Vec<Vec<String>> {
    pages
        .iter()
        .map(|page| page.iter().map(|s| s.to_string()).collect())
        .collect()
}

/// The page of `pages` starting at `offset`
fn page_at(pages: &[Vec<String>], offset: u32) -> Page<String> {
    let mut start = 0u32;
    for (i, page) in pages.iter().enumerate() {
        if start == offset {
            let next = start + page.len() as u32;
            return if i + 1 < pages.len() {
                Page::with_next(page.clone(), next)
            } else {
                Page::last(page.clone())
            };
        }
        start += page.len() as u32;
    }
    Page::last(Vec::new())
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn track(&self, id: &str) -> Result<Option<Track>, FetchError> {
        self.record(format!("track:{}", id));
        self.check(id)?;
        Ok(self.tracks.get(id).cloned())
    }

    async fn album(&self, id: &str) -> Result<Option<Album>, FetchError> {
        self.record(format!("album:{}", id));
        self.check(id)?;
        Ok(self.albums.get(id).cloned())
    }

    async fn album_tracks(&self, album_id: &str, offset: u32) -> Result<Page<TrackRef>, FetchError> {
        self.record(format!("album_tracks:{}:{}", album_id, offset));
        self.check(album_id)?;
        let pages = self
            .listings
            .get(album_id)
            .ok_or_else(|| FetchError::NotFound(album_id.to_string()))?;
        let page = page_at(pages, offset);
        Ok(Page {
            items: page
                .items
                .into_iter()
                .map(|id| TrackRef {
                    id: Some(id),
                    name: String::new(),
                })
                .collect(),
            next_offset: page.next_offset,
        })
    }

    async fn artist_albums(
        &self,
        artist_id: &str,
        offset: u32,
    ) -> Result<Page<AlbumRef>, FetchError> {
        self.record(format!("artist_albums:{}:{}", artist_id, offset));
        self.check(artist_id)?;
        let pages = self
            .discographies
            .get(artist_id)
            .ok_or_else(|| FetchError::NotFound(artist_id.to_string()))?;
        let page = page_at(pages, offset);
        Ok(Page {
            items: page
                .items
                .into_iter()
                .map(|id| AlbumRef {
                    id,
                    name: String::new(),
                    album_group: Some("album".to_string()),
                })
                .collect(),
            next_offset: page.next_offset,
        })
    }
}

fn config() -> ResolvedConfig {
    ResolvedConfig::default().without_delays()
}

fn credentials() -> Credentials {
    Credentials::new("client-id", "client-secret")
}

fn links(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

async fn exported_titles(api: &FakeCatalog, inputs: &[&str]) -> Vec<String> {
    match generate_with(api, &config(), &credentials(), &links(inputs))
        .await
        .unwrap()
    {
        GenerateOutcome::Exported(export) => export
            .table
            .records()
            .iter()
            .map(|r| r.title.clone())
            .collect(),
        other => panic!("expected an export, got {:?}", other),
    }
}

/// One artist with an album (two tracks) and a single (one track)
fn discography() -> FakeCatalog {
    FakeCatalog::new()
        .with_album("alb1", "First Record", "2020-03-01", "111111111111")
        .with_album("sgl1", "Lead Single", "2019-11-15", "222222222222")
        .with_track("t1", "Opening", &["Band"], "alb1", "ISRC00000001")
        .with_track("t2", "Closing", &["Band", "Guest"], "alb1", "ISRC00000002")
        .with_track("t3", "Lead", &["Band"], "sgl1", "ISRC00000003")
        .with_listing("alb1", &[&["t1", "t2"]])
        .with_listing("sgl1", &[&["t3"]])
        .with_discography("art1", &[&["alb1", "sgl1"]])
}

#[tokio::test]
async fn test_single_track_link() {
    let api = discography();

    let outcome = generate_with(
        &api,
        &config(),
        &credentials(),
        &links(&["https://open.spotify.com/track/t2?si=abc"]),
    )
    .await
    .unwrap();

    let export = match outcome {
        GenerateOutcome::Exported(export) => export,
        other => panic!("expected an export, got {:?}", other),
    };

    assert_eq!(export.table.len(), 1);
    let row = &export.table.records()[0];
    assert_eq!(row.title, "Closing");
    assert_eq!(row.artist, "Band, Guest");
    assert_eq!(row.album, "First Record");
    assert_eq!(row.release_date, "2020-03-01");
    assert_eq!(row.upc, "111111111111");
    assert_eq!(row.isrc, "ISRC00000002");
    assert_eq!(row.spotify_link, "https://open.spotify.com/track/t2");
    assert!(row.production_credit.is_empty());
    assert!(row.apple_music_link.is_empty());

    assert_eq!(export.summary.rows, 1);
    assert!(!export.workbook.is_empty());
}

#[tokio::test]
async fn test_album_link_keeps_listing_order() {
    let api = discography();
    let titles = exported_titles(&api, &["https://open.spotify.com/album/alb1"]).await;
    assert_eq!(titles, vec!["Opening", "Closing"]);
}

#[tokio::test]
async fn test_album_pagination_is_followed_in_order() {
    let api = FakeCatalog::new()
        .with_album("big", "Long Record", "2021", "333333333333")
        .with_track("p1", "One", &["Band"], "big", "ISRC00000011")
        .with_track("p2", "Two", &["Band"], "big", "ISRC00000012")
        .with_track("p3", "Three", &["Band"], "big", "ISRC00000013")
        .with_listing("big", &[&["p1", "p2"], &["p3"]]);

    let titles = exported_titles(&api, &["spotify:album:big"]).await;
    assert_eq!(titles, vec!["One", "Two", "Three"]);

    let listing_calls: Vec<String> = api
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("album_tracks:"))
        .collect();
    assert_eq!(listing_calls, vec!["album_tracks:big:0", "album_tracks:big:2"]);

    // Album metadata is fetched once for all three tracks
    assert_eq!(api.count("album:big"), 1);
}

#[tokio::test]
async fn test_artist_link_expands_every_album() {
    let api = discography();
    let titles = exported_titles(&api, &["https://open.spotify.com/artist/art1"]).await;
    assert_eq!(titles, vec!["Opening", "Closing", "Lead"]);
}

#[tokio::test]
async fn test_album_reached_twice_is_expanded_once() {
    let api = discography();

    let titles = exported_titles(
        &api,
        &[
            "https://open.spotify.com/album/alb1",
            "https://open.spotify.com/artist/art1",
        ],
    )
    .await;

    assert_eq!(titles, vec!["Opening", "Closing", "Lead"]);
    assert_eq!(api.count("album_tracks:alb1"), 1);
    assert_eq!(api.count("album_tracks:sgl1"), 1);
}

#[tokio::test]
async fn test_artist_then_album_link_skips_the_album() {
    let api = discography();

    match generate_with(
        &api,
        &config(),
        &credentials(),
        &links(&[
            "https://open.spotify.com/artist/art1",
            "https://open.spotify.com/album/alb1",
        ]),
    )
    .await
    .unwrap()
    {
        GenerateOutcome::Exported(export) => {
            assert_eq!(export.table.len(), 3);
            assert_eq!(export.summary.collections_expanded, 2);
            assert_eq!(export.summary.collections_skipped, 1);
        }
        other => panic!("expected an export, got {:?}", other),
    }
    assert_eq!(api.count("album_tracks:alb1"), 1);
}

#[tokio::test]
async fn test_same_recording_on_single_and_album_is_kept_once() {
    let api = FakeCatalog::new()
        .with_album("sgl", "Hit", "2019-01-01", "444444444444")
        .with_album("lp", "The Album", "2019-06-01", "555555555555")
        .with_track("s1", "Hit", &["Band"], "sgl", "ISRCSHARED01")
        .with_track("a1", "Hit", &["Band"], "lp", "ISRCSHARED01")
        .with_track("a2", "Deep Cut", &["Band"], "lp", "ISRC00000021")
        .with_listing("sgl", &[&["s1"]])
        .with_listing("lp", &[&["a1", "a2"]]);

    let outcome = generate_with(
        &api,
        &config(),
        &credentials(),
        &links(&["spotify:album:sgl", "spotify:album:lp"]),
    )
    .await
    .unwrap();

    let export = match outcome {
        GenerateOutcome::Exported(export) => export,
        other => panic!("expected an export, got {:?}", other),
    };

    let rows = export.table.records();
    assert_eq!(rows.len(), 2);
    // First encounter wins
    assert_eq!(rows[0].album, "Hit");
    assert_eq!(rows[1].title, "Deep Cut");
    assert_eq!(export.summary.removed_by_code, 1);
}

#[tokio::test]
async fn test_same_text_key_without_isrc_is_kept_once() {
    let api = FakeCatalog::new()
        .with_album("lp", "Record", "2018-01-01", "666666666666")
        .with_track("x1", "Song", &["Band"], "lp", "")
        .with_track("x2", "Song", &["Band"], "lp", "");

    let titles = exported_titles(&api, &["spotify:track:x1", "spotify:track:x2"]).await;
    assert_eq!(titles, vec!["Song"]);
}

#[tokio::test]
async fn test_failed_track_lookup_is_skipped() {
    let api = discography().failing("t2");

    let outcome = generate_with(
        &api,
        &config(),
        &credentials(),
        &links(&["https://open.spotify.com/artist/art1"]),
    )
    .await
    .unwrap();

    match outcome {
        GenerateOutcome::Exported(export) => {
            let titles: Vec<&str> = export
                .table
                .records()
                .iter()
                .map(|r| r.title.as_str())
                .collect();
            assert_eq!(titles, vec!["Opening", "Lead"]);
            assert_eq!(export.summary.records_failed, 1);
        }
        other => panic!("expected an export, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_album_listing_does_not_stop_the_run() {
    let api = discography().failing("alb1");

    let titles = exported_titles(
        &api,
        &["https://open.spotify.com/artist/art1", "spotify:track:t1"],
    )
    .await;

    // The album listing failed, the single still expands and the direct
    // track link fails only at its album lookup
    assert_eq!(titles, vec!["Lead"]);
}

#[tokio::test]
async fn test_unrecognized_links_are_skipped() {
    let api = discography();

    match generate_with(
        &api,
        &config(),
        &credentials(),
        &links(&[
            "https://example.com/not-spotify",
            "https://open.spotify.com/playlist/xyz",
            "https://open.spotify.com/track/t1",
        ]),
    )
    .await
    .unwrap()
    {
        GenerateOutcome::Exported(export) => {
            assert_eq!(export.table.len(), 1);
            assert_eq!(export.summary.references_skipped, 2);
        }
        other => panic!("expected an export, got {:?}", other),
    }
}

#[tokio::test]
async fn test_blank_input_makes_no_requests() {
    let api = discography();

    let outcome = generate_with(&api, &config(), &credentials(), &links(&["", "   ", "\t"]))
        .await
        .unwrap();

    assert!(matches!(outcome, GenerateOutcome::NothingToProcess));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_no_rows_is_reported_separately() {
    let api = discography();

    let outcome = generate_with(
        &api,
        &config(),
        &credentials(),
        &links(&["https://open.spotify.com/track/missing0"]),
    )
    .await
    .unwrap();

    match outcome {
        GenerateOutcome::NothingFound(summary) => {
            assert_eq!(summary.records_missing, 1);
            assert_eq!(summary.rows, 0);
        }
        other => panic!("expected NothingFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_request() {
    let api = discography();

    let result = generate_with(
        &api,
        &config(),
        &Credentials::new("client-id", "  "),
        &links(&["https://open.spotify.com/track/t1"]),
    )
    .await;

    assert!(matches!(result, Err(GenerateError::MissingCredentials)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_exported_workbook_matches_table() {
    let api = discography();

    let export = match generate_with(
        &api,
        &config(),
        &credentials(),
        &links(&["https://open.spotify.com/album/alb1"]),
    )
    .await
    .unwrap()
    {
        GenerateOutcome::Exported(export) => export,
        other => panic!("expected an export, got {:?}", other),
    };

    let sheet = workbook::decode(&export.workbook).unwrap();
    assert_eq!(sheet.headers.len(), 13);
    assert_eq!(sheet.len(), 2);

    let title = sheet.column_index("Title").unwrap();
    let isrc = sheet.column_index("ISRC").unwrap();
    assert_eq!(sheet.cell(0, title), "Opening");
    assert_eq!(sheet.cell(1, isrc), "ISRC00000002");
}
