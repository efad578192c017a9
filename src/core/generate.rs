//! The `generate` entry point: links in, workbook bytes out.

use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{CatalogApi, FetchError, SpotifyClient};
use crate::config::{Credentials, ResolvedConfig};
use crate::export::{workbook, ExportError, ResultTable};

use super::aggregator::{Aggregator, RunSummary};

/// A finished export
#[derive(Debug, Clone)]
pub struct CatalogExport {
    /// `.xlsx` bytes
    pub workbook: Vec<u8>,
    pub table: ResultTable,
    pub summary: RunSummary,
}

/// Non-error outcomes of a run
#[derive(Debug, Clone)]
pub enum GenerateOutcome {
    /// At least one row was exported
    Exported(CatalogExport),

    /// The input list was empty or blank; nothing was requested
    NothingToProcess,

    /// Every reference was processed but no row survived
    NothingFound(RunSummary),
}

/// Run-level failures
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Spotify client ID and client secret are both required")]
    MissingCredentials,

    #[error("Spotify authentication failed: {0}")]
    Authentication(#[source] FetchError),

    #[error("Failed to build the workbook: {0}")]
    Serialization(#[from] ExportError),
}

/// Build a catalog workbook from Spotify links using the real Spotify API
#[instrument(skip_all, fields(references = urls.len()))]
pub async fn generate(
    config: &ResolvedConfig,
    credentials: &Credentials,
    urls: &[String],
) -> Result<GenerateOutcome, GenerateError> {
    let inputs = match preflight(credentials, urls)? {
        Some(inputs) => inputs,
        None => return Ok(GenerateOutcome::NothingToProcess),
    };

    let client = SpotifyClient::new(&config.spotify, credentials.clone());
    client.authenticate().await.map_err(|e| {
        error!(error = %e, "Spotify authentication failed");
        GenerateError::Authentication(e)
    })?;

    aggregate_and_export(&client, config, &inputs).await
}

/// Same as [`generate`] against any catalog implementation
pub async fn generate_with(
    api: &dyn CatalogApi,
    config: &ResolvedConfig,
    credentials: &Credentials,
    urls: &[String],
) -> Result<GenerateOutcome, GenerateError> {
    let inputs = match preflight(credentials, urls)? {
        Some(inputs) => inputs,
        None => return Ok(GenerateOutcome::NothingToProcess),
    };

    aggregate_and_export(api, config, &inputs).await
}

/// Validate credentials and drop blank inputs; `None` when nothing is left
fn preflight(credentials: &Credentials, urls: &[String]) -> Result<Option<Vec<String>>, GenerateError> {
    if !credentials.is_complete() {
        error!("Missing Spotify client ID or client secret");
        return Err(GenerateError::MissingCredentials);
    }

    let inputs: Vec<String> = urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect();

    if inputs.is_empty() {
        warn!("No links to process");
        return Ok(None);
    }

    Ok(Some(inputs))
}

async fn aggregate_and_export(
    api: &dyn CatalogApi,
    config: &ResolvedConfig,
    inputs: &[String],
) -> Result<GenerateOutcome, GenerateError> {
    let run_id = Uuid::new_v4();
    info!(%run_id, links = inputs.len(), "Starting catalog run");

    let aggregation = Aggregator::new(api, config.spotify.throttle())
        .run(run_id, inputs)
        .await;

    if aggregation.table.is_empty() {
        warn!(%run_id, "No track data collected");
        return Ok(GenerateOutcome::NothingFound(aggregation.summary));
    }

    let sheet = aggregation.table.to_sheet(&config.export.headers);
    let bytes = workbook::encode(&sheet, &config.export.sheet_name).map_err(|e| {
        error!(%run_id, error = %e, "Failed to encode workbook");
        GenerateError::from(e)
    })?;

    info!(%run_id, rows = aggregation.table.len(), bytes = bytes.len(), "Catalog workbook ready");

    Ok(GenerateOutcome::Exported(CatalogExport {
        workbook: bytes,
        table: aggregation.table,
        summary: aggregation.summary,
    }))
}
