//! Command-line interface for spotify-catalog.
//!
//! Provides commands for generating a catalog workbook from Spotify links,
//! enriching an exported workbook with cross-platform links, and showing
//! the resolved configuration.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, mask, ResolvedConfig};
use crate::core::{generate, GenerateOutcome, RunSummary};
use crate::domain::{split_input_lines, Column};
use crate::enrich;
use crate::export::workbook;

/// Exit status for runs that finished without producing a workbook
const EXIT_NOTHING: i32 = 2;

/// spotify-catalog - Build spreadsheet catalogs from Spotify links
#[derive(Parser, Debug)]
#[command(name = "spotify-catalog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a catalog workbook from track, album and artist links
    Generate {
        /// Spotify links (read from stdin when none are given)
        urls: Vec<String>,

        /// File with one link per line
        #[arg(short = 'f', long)]
        urls_file: Option<PathBuf>,

        /// Output workbook (default: spotify_catalog_<timestamp>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Spotify client ID
        #[arg(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
        client_id: Option<String>,

        /// Spotify client secret
        #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
        client_secret: Option<String>,
    },

    /// Add Apple Music links to an exported catalog workbook
    Enrich {
        /// Workbook to read (left untouched)
        #[arg(short, long)]
        input: PathBuf,

        /// Workbook to write (default: <input>_with_links.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = config::load_config()?;

        match self.command {
            Commands::Generate {
                urls,
                urls_file,
                output,
                client_id,
                client_secret,
            } => {
                run_generate(&config, urls, urls_file, output, client_id, client_secret).await
            }
            Commands::Enrich { input, output } => run_enrich(&config, &input, output).await,
            Commands::Config => show_config(&config),
        }
    }
}

/// Build a catalog and write it to disk
async fn run_generate(
    config: &ResolvedConfig,
    mut urls: Vec<String>,
    urls_file: Option<PathBuf>,
    output: Option<PathBuf>,
    client_id: Option<String>,
    client_secret: Option<String>,
) -> Result<()> {
    let credentials = config
        .credentials
        .clone()
        .overridden_by(client_id, client_secret);

    if !credentials.is_complete() {
        anyhow::bail!(
            "Please provide both a Spotify client ID and client secret \
             (--client-id/--client-secret, {}/{} or the config file)",
            config::ENV_CLIENT_ID,
            config::ENV_CLIENT_SECRET
        );
    }

    if let Some(path) = urls_file {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read links file: {}", path.display()))?;
        urls.extend(split_input_lines(&text));
    } else if urls.is_empty() && !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        urls.extend(split_input_lines(&buffer));
    }

    let output = output.unwrap_or_else(default_output_path);
    eprintln!("📥 Processing {} link(s)... this may take a few minutes", urls.len());

    match generate(config, &credentials, &urls).await? {
        GenerateOutcome::Exported(export) => {
            workbook::write_bytes(&output, &export.workbook)
                .with_context(|| format!("Failed to write workbook: {}", output.display()))?;

            print_summary(&export.summary);
            eprintln!("\n✅ Catalog written to {}", output.display());
            eprintln!("   {} unique track(s)", export.table.len());
            Ok(())
        }
        GenerateOutcome::NothingToProcess => {
            eprintln!("⚠️ The list of links is empty. Please provide at least one Spotify link.");
            std::process::exit(EXIT_NOTHING);
        }
        GenerateOutcome::NothingFound(summary) => {
            print_summary(&summary);
            eprintln!("\n⚠️ No track data was collected from the given links.");
            std::process::exit(EXIT_NOTHING);
        }
    }
}

/// Enrich an exported workbook with secondary-platform links
async fn run_enrich(config: &ResolvedConfig, input: &Path, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(|| enriched_output_path(input));

    eprintln!("🔗 Looking up links for {}", input.display());

    let summary = enrich::enrich_file(config, input, &output)
        .await
        .with_context(|| format!("Failed to enrich {}", input.display()))?;

    eprintln!("\n✅ Enriched workbook written to {}", output.display());
    eprintln!("   Rows:              {}", summary.rows);
    eprintln!("   Already linked:    {}", summary.skipped_existing);
    eprintln!("   Resolved:          {}", summary.resolved);
    eprintln!("   Not found:         {}", summary.not_found);
    eprintln!("   Lookup failures:   {}", summary.failed);
    eprintln!("   No source link:    {}", summary.invalid_source);

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    eprintln!("\nRun {}", summary.run_id);
    eprintln!("   Links:               {}", summary.references);
    eprintln!("   Unrecognized links:  {}", summary.references_skipped);
    eprintln!("   Albums expanded:     {}", summary.collections_expanded);
    eprintln!("   Albums skipped:      {}", summary.collections_skipped);
    eprintln!("   Listing failures:    {}", summary.listings_failed);
    eprintln!("   Tracks visited:      {}", summary.tracks_visited);
    eprintln!("   Rows fetched:        {}", summary.records_fetched);
    eprintln!("   Missing tracks:      {}", summary.records_missing);
    eprintln!("   Failed lookups:      {}", summary.records_failed);
    eprintln!("   Duplicates (ISRC):   {}", summary.removed_by_code);
    eprintln!("   Duplicates (text):   {}", summary.removed_by_text);
}

fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "spotify_catalog_{}.xlsx",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ))
}

/// `catalog.xlsx` -> `catalog_with_links.xlsx`
fn enriched_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "catalog".to_string());
    input.with_file_name(format!("{}_with_links.xlsx", stem))
}

/// Show the resolved configuration (for debugging)
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("Config file: {}", cfg.config_file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(none - using defaults)".to_string()));
    println!();
    println!("Spotify:");
    println!("  Client ID:       {}", mask(&cfg.credentials.client_id));
    println!("  Client secret:   {}", mask(&cfg.credentials.client_secret));
    println!("  API base:        {}", cfg.spotify.api_base);
    println!("  Accounts base:   {}", cfg.spotify.accounts_base);
    println!("  Request delay:   {}ms", cfg.spotify.request_delay_ms);
    println!("  Page size:       {}", cfg.spotify.page_size);
    println!("  Album groups:    {}", cfg.spotify.include_groups);
    println!("  Max attempts:    {}", cfg.spotify.retry.max_attempts);
    println!();
    println!("song.link:");
    println!("  API base:        {}", cfg.songlink.api_base);
    println!("  Platform:        {}", cfg.songlink.platform);
    println!("  Request delay:   {}ms", cfg.songlink.request_delay_ms);
    println!("  Timeout:         {}s", cfg.songlink.timeout_seconds);
    println!();
    println!("Export:");
    println!("  Sheet name:      {}", cfg.export.sheet_name);
    println!("  Columns:");
    for column in Column::ALL {
        println!("    {:<20} {}", column.key(), cfg.export.headers.header(column));
    }

    Ok(())
}
