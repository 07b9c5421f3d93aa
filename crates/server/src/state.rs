//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::catalog::GoogleBooksClient;
use crate::config::ServerConfig;
use crate::description_cache::{RedisDescriptionCache, RedisPool};
use crate::google_auth::GoogleAuthClient;
use crate::openai::{NormalizerError, OpenAiNormalizer};
use crate::storage::PresignedUploader;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("normalizer client: {0}")]
    Normalizer(#[from] NormalizerError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and API clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    catalog: GoogleBooksClient,
    descriptions: RedisDescriptionCache,
    normalizer: OpenAiNormalizer,
    uploader: PresignedUploader,
    google: GoogleAuthClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `redis` - Redis connection pool for cached descriptions
    ///
    /// # Errors
    ///
    /// Returns an error if an API client cannot be built from the configuration.
    pub fn new(config: ServerConfig, pool: PgPool, redis: RedisPool) -> Result<Self, StateError> {
        let catalog = GoogleBooksClient::new(config.google.books_api_key.clone());
        let normalizer = OpenAiNormalizer::new(&config.openai)?;
        let uploader = PresignedUploader::new(&config.storage);
        let google = GoogleAuthClient::new(&config.google);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                descriptions: RedisDescriptionCache::new(redis),
                normalizer,
                uploader,
                google,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Google Books client.
    #[must_use]
    pub fn catalog(&self) -> &GoogleBooksClient {
        &self.inner.catalog
    }

    /// Get a reference to the description cache.
    #[must_use]
    pub fn descriptions(&self) -> &RedisDescriptionCache {
        &self.inner.descriptions
    }

    /// Get a reference to the description normalizer.
    #[must_use]
    pub fn normalizer(&self) -> &OpenAiNormalizer {
        &self.inner.normalizer
    }

    /// Get a reference to the upload URL signer.
    #[must_use]
    pub fn uploader(&self) -> &PresignedUploader {
        &self.inner.uploader
    }

    /// Get a reference to the Google sign-in client.
    #[must_use]
    pub fn google(&self) -> &GoogleAuthClient {
        &self.inner.google
    }
}
