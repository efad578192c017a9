//! The canonical catalog row and its fixed column layout.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Columns of the exported catalog, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Artist,
    Title,
    ReleaseDate,
    Album,
    Upc,
    Isrc,
    SpotifyLink,
    ProductionCredit,
    WritingCredit,
    WavDownloadLink,
    ArtworkLink,
    AppleMusicLink,
    LyricsCreditsFile,
}

impl Column {
    /// Every column, in export order
    pub const ALL: [Column; 13] = [
        Column::Artist,
        Column::Title,
        Column::ReleaseDate,
        Column::Album,
        Column::Upc,
        Column::Isrc,
        Column::SpotifyLink,
        Column::ProductionCredit,
        Column::WritingCredit,
        Column::WavDownloadLink,
        Column::ArtworkLink,
        Column::AppleMusicLink,
        Column::LyricsCreditsFile,
    ];

    /// Stable key used in configuration files
    pub fn key(&self) -> &'static str {
        match self {
            Column::Artist => "artist",
            Column::Title => "title",
            Column::ReleaseDate => "release_date",
            Column::Album => "album",
            Column::Upc => "upc",
            Column::Isrc => "isrc",
            Column::SpotifyLink => "spotify_link",
            Column::ProductionCredit => "production_credit",
            Column::WritingCredit => "writing_credit",
            Column::WavDownloadLink => "wav_download_link",
            Column::ArtworkLink => "artwork_link",
            Column::AppleMusicLink => "apple_music_link",
            Column::LyricsCreditsFile => "lyrics_credits_file",
        }
    }

    /// Header text used when the configuration does not override it
    pub fn default_header(&self) -> &'static str {
        match self {
            Column::Artist => "Artist",
            Column::Title => "Title",
            Column::ReleaseDate => "Original Release Date",
            Column::Album => "Album",
            Column::Upc => "UPC",
            Column::Isrc => "ISRC",
            Column::SpotifyLink => "Spotify Link",
            Column::ProductionCredit => "Production Credit",
            Column::WritingCredit => "Writing Credit",
            Column::WavDownloadLink => "WAV Download Link (44.1kHz)",
            Column::ArtworkLink => "Artwork Link (3000x3000)",
            Column::AppleMusicLink => "Apple Music Link",
            Column::LyricsCreditsFile => "Lyrics & Credits File (optional)",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Position in the exported sheet
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One catalog row.
///
/// Every field is always present; unknown values are empty strings so rows
/// from tracks, albums and artists share one shape. The placeholder fields
/// are left for manual completion after export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Artist names joined with ", "
    pub artist: String,

    pub title: String,

    /// `YYYY-MM-DD`
    pub release_date: String,

    pub album: String,

    /// Universal product code of the album
    pub upc: String,

    /// Recording code of the track
    pub isrc: String,

    pub spotify_link: String,

    pub production_credit: String,
    pub writing_credit: String,
    pub wav_download_link: String,
    pub artwork_link: String,
    pub apple_music_link: String,
    pub lyrics_credits_file: String,
}

impl TrackRecord {
    /// Value of one column
    pub fn field(&self, column: Column) -> &str {
        match column {
            Column::Artist => &self.artist,
            Column::Title => &self.title,
            Column::ReleaseDate => &self.release_date,
            Column::Album => &self.album,
            Column::Upc => &self.upc,
            Column::Isrc => &self.isrc,
            Column::SpotifyLink => &self.spotify_link,
            Column::ProductionCredit => &self.production_credit,
            Column::WritingCredit => &self.writing_credit,
            Column::WavDownloadLink => &self.wav_download_link,
            Column::ArtworkLink => &self.artwork_link,
            Column::AppleMusicLink => &self.apple_music_link,
            Column::LyricsCreditsFile => &self.lyrics_credits_file,
        }
    }

    /// Fallback identity used when the recording code is missing or unreliable
    pub fn text_key(&self) -> (&str, &str, &str) {
        (&self.artist, &self.title, &self.album)
    }
}

/// Precision of an album release date as reported by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePrecision {
    Year,
    Month,
    #[default]
    Day,
}

/// Pad a partial release date out to `YYYY-MM-DD`
pub fn normalize_release_date(date: &str, precision: Option<DatePrecision>) -> String {
    match precision {
        Some(DatePrecision::Year) => format!("{}-01-01", date),
        Some(DatePrecision::Month) => format!("{}-01", date),
        Some(DatePrecision::Day) | None => date.to_string(),
    }
}
