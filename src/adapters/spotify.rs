//! Spotify Web API client.
//!
//! Authenticates with the client-credentials flow and exposes the four
//! read-only lookups the catalog builder needs. Tokens are cached and
//! renewed shortly before they expire; throttled (429) and 5xx responses are
//! retried according to the configured [`RetryPolicy`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{CatalogApi, FetchError};
use crate::config::{Credentials, SpotifySettings};
use crate::domain::{Album, AlbumRef, Page, Track, TrackRef};
use crate::pacing::RetryPolicy;

/// Spotify caps listing pages at 50 items
pub const MAX_PAGE_SIZE: u32 = 50;

/// Renew the token this long before Spotify says it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Spotify Web API client
pub struct SpotifyClient {
    credentials: Credentials,
    api_base: String,
    accounts_base: String,
    page_size: u32,
    include_groups: String,
    retry: RetryPolicy,
    client: reqwest::Client,
    token: Mutex<Option<AccessToken>>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// Response from the accounts token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Spotify paging object
#[derive(Debug, Deserialize)]
struct Paging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    offset: u32,
    #[serde(default)]
    limit: u32,
    #[serde(default)]
    next: Option<String>,
}

impl<T> Paging<T> {
    fn into_page(self) -> Page<T> {
        // An empty page with a next link would never terminate
        let next_offset = match self.next {
            Some(_) if !self.items.is_empty() => {
                let step = if self.limit == 0 {
                    self.items.len() as u32
                } else {
                    self.limit
                };
                Some(self.offset + step)
            }
            _ => None,
        };

        Page {
            items: self.items,
            next_offset,
        }
    }
}

impl SpotifyClient {
    /// Create a client; no request is made until [`authenticate`](Self::authenticate)
    /// or the first lookup.
    pub fn new(settings: &SpotifySettings, credentials: Credentials) -> Self {
        Self {
            credentials,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            accounts_base: settings.accounts_base.trim_end_matches('/').to_string(),
            page_size: settings.page_size.clamp(1, MAX_PAGE_SIZE),
            include_groups: settings.include_groups.clone(),
            retry: settings.retry.clone(),
            client: reqwest::Client::new(),
            token: Mutex::new(None),
        }
    }

    /// Obtain an access token up front so bad credentials fail the run early
    pub async fn authenticate(&self) -> Result<(), FetchError> {
        self.bearer_token().await.map(|_| ())
    }

    fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_base)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn request_token(&self) -> Result<AccessToken, FetchError> {
        let url = self.token_url();
        debug!(%url, "Requesting Spotify access token");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Authentication(format!("{}: {}", status, body.trim())));
        }

        let bytes = response.bytes().await?;
        let token: TokenResponse =
            serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
                url: url.clone(),
                source,
            })?;

        info!(expires_in = token.expires_in, "Spotify access token acquired");

        Ok(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    async fn bearer_token(&self) -> Result<String, FetchError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// GET a JSON resource; `Ok(None)` on 404
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, FetchError> {
        let url = self.api_url(path);
        let mut attempt = 0u32;
        let mut reauthenticated = false;

        loop {
            attempt += 1;
            let token = self.bearer_token().await?;

            debug!(%url, attempt, "GET");
            let result = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .query(query)
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) if self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(%url, attempt, delay_ms = delay.as_millis() as u64, error = %e, "Request failed, retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();

            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }

            // Expired or revoked token: renew once and replay the request
            if status == StatusCode::UNAUTHORIZED && !reauthenticated {
                warn!(%url, "Access token rejected, re-authenticating");
                self.invalidate_token().await;
                reauthenticated = true;
                attempt -= 1;
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                if self.retry.should_retry(attempt) {
                    let delay = self.retry.delay_with_hint(attempt, retry_after(&response));
                    warn!(
                        %url,
                        status = status.as_u16(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Upstream throttled or failing, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }

                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(FetchError::RateLimited { attempts: attempt, url });
                }
            }

            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url,
                });
            }

            let bytes = response.bytes().await?;
            let value = serde_json::from_slice(&bytes)
                .map_err(|source| FetchError::Decode { url: url.clone(), source })?;
            return Ok(Some(value));
        }
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        mut query: Vec<(&str, String)>,
        offset: u32,
    ) -> Result<Page<T>, FetchError> {
        query.push(("limit", self.page_size.to_string()));
        query.push(("offset", offset.to_string()));

        let paging: Paging<T> = self
            .get_json(path, &query)
            .await?
            .ok_or_else(|| FetchError::NotFound(self.api_url(path)))?;

        Ok(paging.into_page())
    }
}

/// Parse the `Retry-After` header (whole seconds)
fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl CatalogApi for SpotifyClient {
    async fn track(&self, id: &str) -> Result<Option<Track>, FetchError> {
        self.get_json(&format!("/tracks/{}", id), &[]).await
    }

    async fn album(&self, id: &str) -> Result<Option<Album>, FetchError> {
        self.get_json(&format!("/albums/{}", id), &[]).await
    }

    async fn album_tracks(&self, album_id: &str, offset: u32) -> Result<Page<TrackRef>, FetchError> {
        self.get_page(&format!("/albums/{}/tracks", album_id), Vec::new(), offset)
            .await
    }

    async fn artist_albums(
        &self,
        artist_id: &str,
        offset: u32,
    ) -> Result<Page<AlbumRef>, FetchError> {
        let mut query = Vec::new();
        if !self.include_groups.is_empty() {
            query.push(("include_groups", self.include_groups.clone()));
        }
        self.get_page(&format!("/artists/{}/albums", artist_id), query, offset)
            .await
    }
}
