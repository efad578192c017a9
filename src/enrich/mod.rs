//! Cross-platform link enrichment of an exported catalog.
//!
//! Reads a workbook, looks up the secondary-platform link (Apple Music by
//! default) for every row that does not already have one, and writes the
//! result to a new workbook. Rows that already hold a link are left alone,
//! so re-running over the output only queries rows still missing a link.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::adapters::{FetchError, LinkResolver, SonglinkClient};
use crate::config::ResolvedConfig;
use crate::domain::Column;
use crate::export::{workbook, ExportError, Sheet};
use crate::pacing::Throttle;

/// Errors that stop an enrichment batch
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Column '{0}' not found in the workbook")]
    MissingColumn(String),

    #[error("Output path must differ from the input path: {0}")]
    SamePath(String),

    #[error("Failed to set up link resolver: {0}")]
    Resolver(#[from] FetchError),

    #[error(transparent)]
    Workbook(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-batch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentSummary {
    pub rows: usize,

    /// Rows that already had a link
    pub skipped_existing: usize,

    /// Rows whose source link is missing or not an http(s) link
    pub invalid_source: usize,

    pub resolved: usize,
    pub not_found: usize,

    /// Lookups that failed and were recorded as not found
    pub failed: usize,
}

impl EnrichmentSummary {
    /// Number of resolver requests made
    pub fn lookups(&self) -> usize {
        self.resolved + self.not_found + self.failed
    }
}

/// Looks like a usable link
pub fn is_link(value: &str) -> bool {
    value.trim().starts_with("http")
}

/// Fill the `target` column of `sheet` from the links in the `source` column
pub async fn enrich_sheet(
    sheet: &mut Sheet,
    resolver: &dyn LinkResolver,
    source_header: &str,
    target_header: &str,
    throttle: Throttle,
) -> Result<EnrichmentSummary, EnrichError> {
    let source = sheet
        .column_index(source_header)
        .ok_or_else(|| EnrichError::MissingColumn(source_header.to_string()))?;
    let target = sheet.ensure_column(target_header);

    let mut summary = EnrichmentSummary {
        rows: sheet.len(),
        ..Default::default()
    };

    info!(rows = summary.rows, resolver = resolver.name(), "Enriching catalog links");

    for row in 0..sheet.len() {
        let existing = sheet.cell(row, target);
        if is_link(existing) {
            debug!(row = row + 1, link = existing, "Link already present, skipping");
            summary.skipped_existing += 1;
            continue;
        }

        let source_link = sheet.cell(row, source).trim().to_string();
        if !is_link(&source_link) {
            debug!(row = row + 1, "No usable source link");
            summary.invalid_source += 1;
            sheet.set_cell(row, target, "");
            continue;
        }

        debug!(row = row + 1, total = summary.rows, source = %source_link, "Resolving");
        let link = match resolver.resolve(&source_link).await {
            Ok(Some(link)) => {
                summary.resolved += 1;
                link
            }
            Ok(None) => {
                summary.not_found += 1;
                String::new()
            }
            Err(e) => {
                warn!(source = %source_link, error = %e, "Link lookup failed");
                summary.failed += 1;
                String::new()
            }
        };

        sheet.set_cell(row, target, link);
        throttle.pause().await;
    }

    info!(
        resolved = summary.resolved,
        not_found = summary.not_found,
        failed = summary.failed,
        skipped = summary.skipped_existing,
        "Enrichment finished"
    );

    Ok(summary)
}

/// Enrich `input` into `output` using song.link
pub async fn enrich_file(
    config: &ResolvedConfig,
    input: &Path,
    output: &Path,
) -> Result<EnrichmentSummary, EnrichError> {
    let resolver = SonglinkClient::new(&config.songlink)?;
    enrich_file_with(&resolver, config, input, output).await
}

/// Enrich `input` into `output` with any resolver; `input` is never modified
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub async fn enrich_file_with(
    resolver: &dyn LinkResolver,
    config: &ResolvedConfig,
    input: &Path,
    output: &Path,
) -> Result<EnrichmentSummary, EnrichError> {
    if same_file(input, output) {
        return Err(EnrichError::SamePath(output.display().to_string()));
    }

    let mut sheet = workbook::read_file(input)?;

    let headers = &config.export.headers;
    let summary = enrich_sheet(
        &mut sheet,
        resolver,
        headers.header(Column::SpotifyLink),
        headers.header(Column::AppleMusicLink),
        config.songlink.throttle(),
    )
    .await?;

    workbook::write_file(output, &sheet, &config.export.sheet_name)?;
    info!(path = %output.display(), "Enriched workbook written");

    Ok(summary)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
