//! Core catalog logic.
//!
//! This module contains:
//! - Expander: references to track ids (pagination, album bookkeeping)
//! - Details: track + album lookup flattened into rows
//! - Dedup: the two-pass deduplication
//! - Aggregator: drives the above across an input list
//! - Generate: the end-to-end entry point producing workbook bytes

pub mod aggregator;
pub mod dedup;
pub mod details;
pub mod expander;
pub mod generate;

// Re-export commonly used types
pub use aggregator::{Aggregation, Aggregator, RunSummary};
pub use dedup::{deduplicate, DedupReport, ProcessedSets};
pub use details::{build_record, DetailFetcher};
pub use expander::{ExpansionStats, Expander};
pub use generate::{generate, generate_with, CatalogExport, GenerateError, GenerateOutcome};
