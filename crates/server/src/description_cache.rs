//! Redis-backed cache of normalized book descriptions.
//!
//! Entries are stored under `description:{volume_id}` without expiry. A
//! description only changes when an operator evicts it (`vp-cli description
//! evict`), after which the next view normalizes it again.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis::{self, AsyncCommands};
use bb8_redis::{RedisConnectionManager, bb8};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

use violet_pages_core::VolumeId;

use crate::ports::DescriptionCache;

/// Pooled Redis connections.
pub type RedisPool = bb8::Pool<RedisConnectionManager>;

/// Errors from the description cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Redis command or connection failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// No pooled connection became available in time.
    #[error("timed out waiting for a redis connection")]
    Timeout,
}

impl From<bb8::RunError<redis::RedisError>> for CacheError {
    fn from(err: bb8::RunError<redis::RedisError>) -> Self {
        match err {
            bb8::RunError::User(e) => Self::Redis(e),
            bb8::RunError::TimedOut => Self::Timeout,
        }
    }
}

/// Create a Redis connection pool.
///
/// # Errors
///
/// Returns `CacheError::Redis` if the URL is invalid or Redis is unreachable.
pub async fn create_redis_pool(redis_url: &SecretString) -> Result<RedisPool, CacheError> {
    let manager = RedisConnectionManager::new(redis_url.expose_secret())?;
    let pool = bb8::Pool::builder()
        .max_size(10)
        .connection_timeout(Duration::from_secs(5))
        .build(manager)
        .await?;
    Ok(pool)
}

/// Cache key for a volume's description.
#[must_use]
pub fn description_key(book: &VolumeId) -> String {
    format!("description:{book}")
}

/// Description cache stored in Redis.
#[derive(Clone)]
pub struct RedisDescriptionCache {
    pool: RedisPool,
}

impl RedisDescriptionCache {
    #[must_use]
    pub const fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DescriptionCache for RedisDescriptionCache {
    #[instrument(skip(self, book), fields(volume_id = %book))]
    async fn get(&self, book: &VolumeId) -> Result<Option<String>, CacheError> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = conn.get(description_key(book)).await?;
        Ok(value)
    }

    #[instrument(skip(self, book, text), fields(volume_id = %book, len = text.len()))]
    async fn put(&self, book: &VolumeId, text: &str) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        conn.set::<_, _, ()>(description_key(book), text).await?;
        Ok(())
    }

    #[instrument(skip(self, book), fields(volume_id = %book))]
    async fn evict(&self, book: &VolumeId) -> Result<bool, CacheError> {
        let mut conn = self.pool.get().await?;
        let removed: i64 = conn.del(description_key(book)).await?;
        Ok(removed > 0)
    }
}
