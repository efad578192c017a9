//! song.link (Odesli) client for cross-platform link lookup.
//!
//! Endpoint: GET /links?url=<source link>
//! The matching link for each platform lives under
//! `linksByPlatform.<platform>.url`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{FetchError, LinkResolver};
use crate::config::SonglinkSettings;

/// song.link API client
pub struct SonglinkClient {
    api_base: String,
    platform: String,
    client: reqwest::Client,
}

/// Subset of the song.link response we read
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinksResponse {
    #[serde(default)]
    links_by_platform: HashMap<String, PlatformLink>,
}

#[derive(Debug, Deserialize)]
struct PlatformLink {
    #[serde(default)]
    url: Option<String>,
}

impl SonglinkClient {
    /// Create a client for the configured target platform
    pub fn new(settings: &SonglinkSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            platform: settings.platform.clone(),
            client,
        })
    }

    fn links_url(&self) -> String {
        format!("{}/links", self.api_base)
    }

    /// Target platform key (e.g. `appleMusic`)
    pub fn platform(&self) -> &str {
        &self.platform
    }
}

#[async_trait]
impl LinkResolver for SonglinkClient {
    fn name(&self) -> &str {
        "song.link"
    }

    async fn resolve(&self, source_link: &str) -> Result<Option<String>, FetchError> {
        let url = self.links_url();
        debug!(%source_link, platform = %self.platform, "Resolving link");

        let response = self
            .client
            .get(&url)
            .query(&[("url", source_link)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let bytes = response.bytes().await?;
        let links: LinksResponse =
            serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
                url: url.clone(),
                source,
            })?;

        Ok(links
            .links_by_platform
            .get(&self.platform)
            .and_then(|link| link.url.clone())
            .filter(|link| !link.is_empty()))
    }
}
