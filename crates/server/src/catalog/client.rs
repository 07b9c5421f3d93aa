//! HTTP client for the Google Books API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use violet_pages_core::VolumeId;

use super::{CatalogError, Volume, VolumeSearch};
use crate::ports::BookCatalog;

const GOOGLE_BOOKS_API_URL: &str = "https://www.googleapis.com/books/v1";

/// Results per search page.
pub const PAGE_SIZE: u32 = 10;

/// Client for the Google Books API.
///
/// Volume lookups are cached for 5 minutes. Searches are not cached.
#[derive(Clone)]
pub struct GoogleBooksClient {
    inner: Arc<GoogleBooksClientInner>,
}

struct GoogleBooksClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    volumes: Cache<VolumeId, Volume>,
}

impl GoogleBooksClient {
    /// Create a new Google Books client.
    #[must_use]
    pub fn new(api_key: SecretString) -> Self {
        Self::with_base_url(api_key, GOOGLE_BOOKS_API_URL)
    }

    /// Create a client against a different API root.
    #[must_use]
    pub fn with_base_url(api_key: SecretString, base_url: &str) -> Self {
        let volumes = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(GoogleBooksClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key,
                volumes,
            }),
        }
    }

    /// Look up a single volume.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the catalog has no such volume.
    #[instrument(skip(self, id), fields(volume_id = %id))]
    pub async fn get_volume(&self, id: &VolumeId) -> Result<Volume, CatalogError> {
        if let Some(volume) = self.inner.volumes.get(id).await {
            debug!("Cache hit for volume");
            return Ok(volume);
        }

        let url = format!("{}/volumes/{}", self.inner.base_url, id.as_str());
        let volume: Volume = self
            .get_json(&url, &[], || format!("Volume not found: {id}"))
            .await?;

        self.inner.volumes.insert(id.clone(), volume.clone()).await;

        Ok(volume)
    }

    /// Search volumes, returning up to [`PAGE_SIZE`] results from `start_index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn search_volumes(
        &self,
        query: &str,
        start_index: u32,
    ) -> Result<VolumeSearch, CatalogError> {
        let url = format!("{}/volumes", self.inner.base_url);
        let start_index = start_index.to_string();
        let max_results = PAGE_SIZE.to_string();
        let params = [
            ("q", query),
            ("startIndex", start_index.as_str()),
            ("maxResults", max_results.as_str()),
        ];

        self.get_json(&url, &params, || format!("No results for {query:?}"))
            .await
    }

    /// Execute a GET request and parse the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        not_found: impl FnOnce() -> String,
    ) -> Result<T, CatalogError> {
        let url = url::Url::parse_with_params(
            url,
            params
                .iter()
                .copied()
                .chain([("key", self.inner.api_key.expose_secret())]),
        )
        .map_err(|e| CatalogError::Malformed(format!("invalid request URL: {e}")))?;

        let response = self.inner.client.get(url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(not_found()));
        }

        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Google Books API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse Google Books response"
            );
            CatalogError::Malformed(e.to_string())
        })
    }
}

#[async_trait]
impl BookCatalog for GoogleBooksClient {
    async fn volume(&self, id: &VolumeId) -> Result<Volume, CatalogError> {
        self.get_volume(id).await
    }

    async fn search(&self, query: &str, start_index: u32) -> Result<VolumeSearch, CatalogError> {
        self.search_volumes(query, start_index).await
    }
}
