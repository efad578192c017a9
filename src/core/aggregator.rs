//! Aggregation of a whole input list into a deduplicated result table.
//!
//! Drives classification, expansion and detail lookup strictly in input
//! order, one request at a time, then runs the two deduplication passes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::CatalogApi;
use crate::domain::{classify, TrackRecord};
use crate::export::ResultTable;
use crate::pacing::Throttle;

use super::dedup::{deduplicate, ProcessedSets};
use super::details::DetailFetcher;
use super::expander::{ExpansionStats, Expander};

/// What happened during one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Input references received
    pub references: usize,

    /// References that could not be classified
    pub references_skipped: usize,

    pub collections_expanded: usize,
    pub collections_skipped: usize,
    pub listings_failed: usize,

    /// Track ids produced by expansion
    pub tracks_visited: usize,

    /// Rows built before deduplication
    pub records_fetched: usize,

    /// Tracks (or their albums) that did not exist
    pub records_missing: usize,

    /// Tracks whose lookup failed
    pub records_failed: usize,

    pub removed_by_code: usize,
    pub removed_by_text: usize,

    /// Rows in the final table
    pub rows: usize,
}

impl RunSummary {
    pub fn new(run_id: Uuid, references: usize) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: None,
            references,
            references_skipped: 0,
            collections_expanded: 0,
            collections_skipped: 0,
            listings_failed: 0,
            tracks_visited: 0,
            records_fetched: 0,
            records_missing: 0,
            records_failed: 0,
            removed_by_code: 0,
            removed_by_text: 0,
            rows: 0,
        }
    }

    fn absorb(&mut self, stats: ExpansionStats) {
        self.collections_expanded = stats.collections_expanded;
        self.collections_skipped = stats.collections_skipped;
        self.listings_failed = stats.listings_failed;
    }
}

/// Result of [`Aggregator::run`]
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub table: ResultTable,
    pub summary: RunSummary,
}

/// Runs classification, expansion, lookup and deduplication over an input list
pub struct Aggregator<'a> {
    api: &'a dyn CatalogApi,
    throttle: Throttle,
}

impl<'a> Aggregator<'a> {
    pub fn new(api: &'a dyn CatalogApi, throttle: Throttle) -> Self {
        Self { api, throttle }
    }

    /// Process every reference in order and deduplicate the collected rows
    #[instrument(skip_all, fields(run_id = %run_id, references = inputs.len()))]
    pub async fn run(&self, run_id: Uuid, inputs: &[String]) -> Aggregation {
        let mut summary = RunSummary::new(run_id, inputs.len());
        let mut sets = ProcessedSets::new();

        let records = self.collect(inputs, &mut sets, &mut summary).await;
        summary.records_fetched = records.len();

        let report = deduplicate(records, &mut sets);
        summary.removed_by_code = report.removed_by_code;
        summary.removed_by_text = report.removed_by_text;
        summary.rows = report.records.len();
        summary.finished_at = Some(Utc::now());

        info!(
            fetched = summary.records_fetched,
            removed_by_code = summary.removed_by_code,
            removed_by_text = summary.removed_by_text,
            rows = summary.rows,
            "Aggregation finished"
        );

        Aggregation {
            table: ResultTable::new(report.records),
            summary,
        }
    }

    /// Collect rows in encounter order, before deduplication
    async fn collect(
        &self,
        inputs: &[String],
        sets: &mut ProcessedSets,
        summary: &mut RunSummary,
    ) -> Vec<TrackRecord> {
        let expander = Expander::new(self.api, self.throttle);
        let mut fetcher = DetailFetcher::new(self.api);
        let mut stats = ExpansionStats::default();
        let mut records = Vec::new();

        for (index, input) in inputs.iter().enumerate() {
            let reference = match classify(input) {
                Ok(reference) => reference,
                Err(e) => {
                    warn!(input = %input, error = %e, "Skipping unrecognized reference");
                    summary.references_skipped += 1;
                    continue;
                }
            };

            info!(%reference, position = index + 1, total = inputs.len(), "Processing reference");

            let track_ids = expander
                .expand(&reference, &mut sets.collections, &mut stats)
                .await;
            summary.tracks_visited += track_ids.len();

            for (i, track_id) in track_ids.iter().enumerate() {
                debug!(track_id, position = i + 1, total = track_ids.len(), "Fetching track details");

                match fetcher.fetch(track_id).await {
                    Ok(Some(record)) => records.push(record),
                    Ok(None) => summary.records_missing += 1,
                    Err(e) => {
                        error!(track_id, error = %e, "Failed to fetch track details");
                        summary.records_failed += 1;
                    }
                }

                self.throttle.pause().await;
            }
        }

        summary.absorb(stats);
        records
    }
}
