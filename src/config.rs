//! Configuration for spotify-catalog.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (credentials, paths)
//! 2. Environment variables (SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET,
//!    SPOTIFY_CATALOG_CONFIG)
//! 3. Config file (.spotify-catalog/config.yaml)
//! 4. Defaults
//!
//! Config file discovery:
//! - `SPOTIFY_CATALOG_CONFIG` if set
//! - Searches current directory and parents for .spotify-catalog/config.yaml
//! - Falls back to ~/.spotify-catalog/config.yaml
//!
//! The resolved configuration is a plain value passed into each entry point;
//! nothing is cached process-wide.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::export::ColumnHeaders;
use crate::pacing::{RetryPolicy, Throttle};

/// Directory holding the config file
pub const CONFIG_DIR: &str = ".spotify-catalog";

/// Config file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.yaml";

pub const ENV_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
pub const ENV_CONFIG_PATH: &str = "SPOTIFY_CATALOG_CONFIG";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub songlink: SonglinkConfig,
    #[serde(default)]
    pub export: ExportConfig,
    /// Column key -> header text overrides
    #[serde(default)]
    pub columns: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base: Option<String>,
    pub accounts_base: Option<String>,
    pub request_delay_ms: Option<u64>,
    pub page_size: Option<u32>,
    pub include_groups: Option<String>,
    pub retry: Option<RetryPolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SonglinkConfig {
    pub api_base: Option<String>,
    pub platform: Option<String>,
    pub request_delay_ms: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    pub sheet_name: Option<String>,
}

/// Spotify client-credentials pair
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Both halves present (whitespace does not count)
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    /// Replace each half that is given, keeping the rest
    pub fn overridden_by(self, client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.unwrap_or(self.client_id),
            client_secret: client_secret.unwrap_or(self.client_secret),
        }
    }
}

// Never print secrets
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &mask(&self.client_id))
            .field("client_secret", &mask(&self.client_secret))
            .finish()
    }
}

/// Show only the last four characters of a secret
pub fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Resolved Spotify API settings
#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub api_base: String,
    pub accounts_base: String,
    /// Pause after every catalog request
    pub request_delay_ms: u64,
    pub page_size: u32,
    /// Album groups listed for an artist (comma-separated)
    pub include_groups: String,
    pub retry: RetryPolicy,
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.spotify.com/v1".to_string(),
            accounts_base: "https://accounts.spotify.com".to_string(),
            request_delay_ms: 200,
            page_size: 50,
            include_groups: "album,single".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl SpotifySettings {
    pub fn throttle(&self) -> Throttle {
        Throttle::from_millis(self.request_delay_ms)
    }
}

/// Resolved song.link settings
#[derive(Debug, Clone)]
pub struct SonglinkSettings {
    pub api_base: String,
    /// Platform key under `linksByPlatform`
    pub platform: String,
    pub request_delay_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for SonglinkSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.song.link/v1-alpha.1".to_string(),
            platform: "appleMusic".to_string(),
            request_delay_ms: 500,
            timeout_seconds: 10,
        }
    }
}

impl SonglinkSettings {
    pub fn throttle(&self) -> Throttle {
        Throttle::from_millis(self.request_delay_ms)
    }
}

/// Resolved export settings
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub sheet_name: String,
    pub headers: ColumnHeaders,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            sheet_name: "Catalog".to_string(),
            headers: ColumnHeaders::default(),
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub credentials: Credentials,
    pub spotify: SpotifySettings,
    pub songlink: SonglinkSettings,
    pub export: ExportSettings,
}

impl ResolvedConfig {
    /// Merge a parsed config file over the defaults
    pub fn from_file(file: ConfigFile, config_file: Option<PathBuf>) -> Result<Self> {
        let spotify_defaults = SpotifySettings::default();
        let songlink_defaults = SonglinkSettings::default();
        let export_defaults = ExportSettings::default();

        let headers = ColumnHeaders::with_overrides(&file.columns)
            .context("Invalid `columns` section in config file")?;

        let credentials = Credentials::new(
            file.spotify.client_id.unwrap_or_default(),
            file.spotify.client_secret.unwrap_or_default(),
        );

        Ok(Self {
            config_file,
            credentials,
            spotify: SpotifySettings {
                api_base: file.spotify.api_base.unwrap_or(spotify_defaults.api_base),
                accounts_base: file
                    .spotify
                    .accounts_base
                    .unwrap_or(spotify_defaults.accounts_base),
                request_delay_ms: file
                    .spotify
                    .request_delay_ms
                    .unwrap_or(spotify_defaults.request_delay_ms),
                page_size: file.spotify.page_size.unwrap_or(spotify_defaults.page_size),
                include_groups: file
                    .spotify
                    .include_groups
                    .unwrap_or(spotify_defaults.include_groups),
                retry: file.spotify.retry.unwrap_or(spotify_defaults.retry),
            },
            songlink: SonglinkSettings {
                api_base: file.songlink.api_base.unwrap_or(songlink_defaults.api_base),
                platform: file.songlink.platform.unwrap_or(songlink_defaults.platform),
                request_delay_ms: file
                    .songlink
                    .request_delay_ms
                    .unwrap_or(songlink_defaults.request_delay_ms),
                timeout_seconds: file
                    .songlink
                    .timeout_seconds
                    .unwrap_or(songlink_defaults.timeout_seconds),
            },
            export: ExportSettings {
                sheet_name: file.export.sheet_name.unwrap_or(export_defaults.sheet_name),
                headers,
            },
        })
    }

    /// Settings with every courtesy delay and retry disabled (tests)
    pub fn without_delays(mut self) -> Self {
        self.spotify.request_delay_ms = 0;
        self.spotify.retry = RetryPolicy::no_retry();
        self.songlink.request_delay_ms = 0;
        self
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(CONFIG_DIR).join(CONFIG_FILE);
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from all sources except command-line flags
pub fn load_config() -> Result<ResolvedConfig> {
    let config_file = match std::env::var(ENV_CONFIG_PATH) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => find_config_file(),
    };

    let mut config = match config_file {
        Some(ref path) => ResolvedConfig::from_file(load_config_file(path)?, Some(path.clone()))?,
        None => ResolvedConfig::default(),
    };

    config.credentials = config.credentials.overridden_by(
        std::env::var(ENV_CLIENT_ID).ok(),
        std::env::var(ENV_CLIENT_SECRET).ok(),
    );

    Ok(config)
}
