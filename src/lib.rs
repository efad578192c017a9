//! spotify-catalog - Spreadsheet catalogs from Spotify links
//!
//! Turns a list of Spotify track, album and artist links into a single
//! deduplicated table of track metadata and exports it as an `.xlsx`
//! workbook. An exported workbook can later be enriched with links to a
//! second streaming platform through the song.link service.
//!
//! # Architecture
//!
//! Generation is a strictly sequential pipeline:
//! - Each input link is classified into a track, album or artist reference
//! - Collection references are expanded into track IDs (each album once per run)
//! - Every track ID is resolved into a flat record with release metadata
//! - Records are deduplicated by ISRC, then by (title, artists, album)
//! - The surviving rows are encoded as a workbook
//!
//! # Modules
//!
//! - `adapters`: External services (Spotify Web API, song.link)
//! - `core`: Expansion, detail lookup, aggregation and deduplication
//! - `domain`: Data structures (references, API records, track rows)
//! - `export`: Table layout and workbook encoding
//! - `enrich`: Cross-platform link enrichment of exported workbooks
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Build a catalog
//! spotify-catalog generate https://open.spotify.com/album/4aawyAB9vmqN3uQ7FjRGTy -o catalog.xlsx
//!
//! # Links from a file
//! spotify-catalog generate -f links.txt
//!
//! # Add Apple Music links
//! spotify-catalog enrich -i catalog.xlsx -o catalog_with_links.xlsx
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod enrich;
pub mod export;
pub mod pacing;

// Re-export main types at crate root for convenience
pub use adapters::{CatalogApi, FetchError, LinkResolver, SonglinkClient, SpotifyClient};
pub use config::{Credentials, ResolvedConfig};
pub use self::core::{generate, generate_with, CatalogExport, GenerateError, GenerateOutcome, RunSummary};
pub use domain::{classify, ClassifiedReference, Column, ReferenceKind, TrackRecord};
pub use enrich::{enrich_file, enrich_sheet, EnrichError, EnrichmentSummary};
pub use export::{ColumnHeaders, ExportError, ResultTable, Sheet};
pub use pacing::{RetryPolicy, Throttle};
