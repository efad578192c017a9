//! Classification of raw Spotify links into typed references.
//!
//! Accepts web links (`https://open.spotify.com/track/<id>?si=...`) and
//! URIs (`spotify:album:<id>`). Anything else is unclassifiable.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of catalog entity a link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// A single track
    Track,

    /// An album or single (ordered group of tracks)
    Album,

    /// An artist (publishes albums)
    Artist,
}

impl ReferenceKind {
    fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "track" => Some(Self::Track),
            "album" => Some(Self::Album),
            "artist" => Some(Self::Artist),
            _ => None,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Track => write!(f, "track"),
            ReferenceKind::Album => write!(f, "album"),
            ReferenceKind::Artist => write!(f, "artist"),
        }
    }
}

/// A link resolved to its kind and catalog id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassifiedReference {
    pub kind: ReferenceKind,
    pub id: String,
}

impl ClassifiedReference {
    pub fn new(kind: ReferenceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ClassifiedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// The input did not contain a recognizable track/album/artist marker
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized Spotify reference: {0}")]
pub struct ClassifyError(pub String);

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(track|album|artist)[/:]([A-Za-z0-9]+)").expect("reference pattern is valid")
    })
}

/// Classify a raw input string
///
/// The first `track|album|artist` marker followed by `/` or `:` wins; the id
/// runs until the first non-alphanumeric character, so query suffixes such as
/// `?si=...` are dropped.
pub fn classify(input: &str) -> Result<ClassifiedReference, ClassifyError> {
    let trimmed = input.trim();
    let captures = reference_pattern()
        .captures(trimmed)
        .ok_or_else(|| ClassifyError(trimmed.to_string()))?;

    let kind = ReferenceKind::from_marker(&captures[1])
        .ok_or_else(|| ClassifyError(trimmed.to_string()))?;

    Ok(ClassifiedReference::new(kind, &captures[2]))
}

/// Split free-form text into candidate references (one per non-blank line)
pub fn split_input_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_track_link_with_query() {
        let reference =
            classify("https://open.spotify.com/track/4EhADWdV6hJgsuLR8yu3e2?si=7a54365467894d88")
                .unwrap();
        assert_eq!(reference.kind, ReferenceKind::Track);
        assert_eq!(reference.id, "4EhADWdV6hJgsuLR8yu3e2");
    }

    #[test]
    fn test_classify_album_and_artist() {
        let album = classify("https://open.spotify.com/album/4N4yHAXd3i4QL6ojBckdbo").unwrap();
        assert_eq!(album, ClassifiedReference::new(ReferenceKind::Album, "4N4yHAXd3i4QL6ojBckdbo"));

        let artist =
            classify("  https://open.spotify.com/artist/1MyVqiOTfhfsN99ke0rd8g?si=375E  ").unwrap();
        assert_eq!(artist.kind, ReferenceKind::Artist);
        assert_eq!(artist.id, "1MyVqiOTfhfsN99ke0rd8g");
    }

    #[test]
    fn test_classify_localized_link() {
        let reference =
            classify("https://open.spotify.com/intl-de/track/0kbBhomoyHwQPqeJd8iRCu").unwrap();
        assert_eq!(reference.kind, ReferenceKind::Track);
        assert_eq!(reference.id, "0kbBhomoyHwQPqeJd8iRCu");
    }

    #[test]
    fn test_classify_uri() {
        let reference = classify("spotify:album:1YFdhcXAegRmPSFwPTjO9N").unwrap();
        assert_eq!(reference.kind, ReferenceKind::Album);
        assert_eq!(reference.id, "1YFdhcXAegRmPSFwPTjO9N");
    }

    #[test]
    fn test_classify_rejects_unknown() {
        assert!(classify("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M").is_err());
        assert!(classify("not a link").is_err());
        assert!(classify("https://open.spotify.com/track/").is_err());
        assert!(classify("").is_err());
    }

    #[test]
    fn test_split_input_lines() {
        let lines = split_input_lines("a\n\n   \n  b  \r\nc");
        assert_eq!(lines, vec!["a", "b", "c"]);
        assert!(split_input_lines("  \n\t\n").is_empty());
    }
}
