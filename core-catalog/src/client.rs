//! Catalog API client
//!
//! Fetches the song list and single songs from the streaming server over the
//! injected [`HttpClient`].

use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{CatalogError, Result};
use crate::locator::StreamLocator;
use crate::models::{PlaylistResponse, Song};

/// Catalog API client
///
/// # Example
///
/// ```ignore
/// use core_catalog::CatalogClient;
///
/// let client = CatalogClient::new(http_client, "http://10.0.2.2:8080/api", Duration::from_secs(30));
/// let playlist = client.fetch_all_songs().await?;
/// println!("{} songs", playlist.songs.len());
/// ```
pub struct CatalogClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout: Duration,
}

impl CatalogClient {
    /// Create a new catalog client
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `base_url` - API root, e.g. `http://10.0.2.2:8080/api`
    /// * `timeout` - per-request deadline
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Locator producing stream URIs on the same server.
    pub fn stream_locator(&self) -> StreamLocator {
        StreamLocator::new(self.base_url.clone())
    }

    /// `GET {base}/songs`
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_all_songs(&self) -> Result<PlaylistResponse> {
        let url = format!("{}/songs", self.base_url);
        let playlist: PlaylistResponse = self.get_json(url).await?;

        info!(count = playlist.songs.len(), total = playlist.total, "Loaded songs");
        Ok(playlist)
    }

    /// `GET {base}/song/{id}`
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_song(&self, song_id: &str) -> Result<Song> {
        let url = format!("{}/song/{}", self.base_url, song_id);
        let song: Song = self.get_json(url).await?;

        info!(title = %song.title, "Loaded song");
        Ok(song)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!(url = %url, "GET");

        let request = HttpRequest::get(url).accept_json().timeout(self.timeout);
        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(error = %e, "Catalog request failed");
            CatalogError::from(e)
        })?;

        Self::parse(response)
    }

    fn parse<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
        if !response.is_success() {
            let message = response
                .text()
                .ok()
                .filter(|body| !body.trim().is_empty())
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            warn!(status = response.status, message = %message, "Catalog API error");

            return Err(CatalogError::Http {
                status: response.status,
                message,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| CatalogError::Parse(e.to_string()))
    }
}
