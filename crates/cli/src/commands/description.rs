//! Description cache maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Drop a cached description so the next view normalizes it again
//! vp-cli description evict zyTCAlFPjgYC
//! ```
//!
//! # Environment Variables
//!
//! - `REDIS_URL` - Redis connection string

use secrecy::SecretString;
use thiserror::Error;

use violet_pages_core::{VolumeId, VolumeIdError};
use violet_pages_server::description_cache::{
    CacheError, RedisDescriptionCache, create_redis_pool,
};
use violet_pages_server::ports::DescriptionCache;

/// Errors from description commands.
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid volume id: {0}")]
    InvalidVolumeId(#[from] VolumeIdError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Remove the cached description for `volume_id`.
///
/// Returns whether an entry existed.
///
/// # Errors
///
/// Returns an error for an invalid id or if Redis is unreachable.
pub async fn evict(volume_id: &str) -> Result<bool, DescriptionError> {
    dotenvy::dotenv().ok();

    let id = VolumeId::parse(volume_id)?;
    let redis_url = std::env::var("REDIS_URL")
        .map(SecretString::from)
        .map_err(|_| DescriptionError::MissingEnvVar("REDIS_URL"))?;

    let cache = RedisDescriptionCache::new(create_redis_pool(&redis_url).await?);
    let removed = cache.evict(&id).await?;

    if removed {
        tracing::info!(volume_id = %id, "Evicted cached description");
    } else {
        tracing::info!(volume_id = %id, "No cached description");
    }
    Ok(removed)
}
