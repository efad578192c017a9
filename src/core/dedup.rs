//! Two-pass, order-stable deduplication of catalog rows.
//!
//! Pass one drops rows whose recording code (ISRC) was already seen; rows
//! without a code are never compared on this pass. Pass two drops rows whose
//! (artist, title, album) triple was already seen, looking only at the
//! survivors of pass one. Both passes keep the first occurrence. Comparisons
//! are exact: no case folding, no whitespace normalization.

use std::collections::HashSet;

use crate::domain::TrackRecord;

/// Membership sets for one aggregation run
#[derive(Debug, Default)]
pub struct ProcessedSets {
    /// Albums already expanded into track ids
    pub collections: HashSet<String>,

    /// Recording codes already kept
    pub recording_codes: HashSet<String>,

    /// (artist, title, album) triples already kept
    pub text_keys: HashSet<(String, String, String)>,
}

impl ProcessedSets {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of running both passes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupReport {
    pub records: Vec<TrackRecord>,
    pub removed_by_code: usize,
    pub removed_by_text: usize,
}

/// Pass one: drop later rows sharing a non-empty recording code
pub fn dedup_by_recording_code(
    records: Vec<TrackRecord>,
    seen: &mut HashSet<String>,
) -> (Vec<TrackRecord>, usize) {
    let before = records.len();
    let kept: Vec<TrackRecord> = records
        .into_iter()
        .filter(|record| record.isrc.is_empty() || seen.insert(record.isrc.clone()))
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Pass two: drop later rows sharing the (artist, title, album) triple
pub fn dedup_by_text_key(
    records: Vec<TrackRecord>,
    seen: &mut HashSet<(String, String, String)>,
) -> (Vec<TrackRecord>, usize) {
    let before = records.len();
    let kept: Vec<TrackRecord> = records
        .into_iter()
        .filter(|record| {
            let (artist, title, album) = record.text_key();
            seen.insert((artist.to_string(), title.to_string(), album.to_string()))
        })
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Run both passes in order
pub fn deduplicate(records: Vec<TrackRecord>, sets: &mut ProcessedSets) -> DedupReport {
    let (records, removed_by_code) = dedup_by_recording_code(records, &mut sets.recording_codes);
    let (records, removed_by_text) = dedup_by_text_key(records, &mut sets.text_keys);

    DedupReport {
        records,
        removed_by_code,
        removed_by_text,
    }
}
