//! Domain types for the catalog builder.
//!
//! This module contains the core data structures:
//! - Reference: classified Spotify links
//! - Track: the canonical export row and its column layout
//! - Catalog: typed API records (tracks, albums, pages)

pub mod catalog;
pub mod reference;
pub mod track;

// Re-export commonly used types
pub use catalog::{Album, AlbumRef, ArtistRef, ExternalIds, ExternalUrls, Page, Track, TrackRef};
pub use reference::{classify, split_input_lines, ClassifiedReference, ClassifyError, ReferenceKind};
pub use track::{normalize_release_date, Column, DatePrecision, TrackRecord};
