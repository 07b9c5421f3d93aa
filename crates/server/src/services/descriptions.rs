//! Cached description normalization.
//!
//! A book's raw catalog description is run through the text normalizer once
//! and the result is kept in the description cache. Later views return the
//! cached text verbatim. Two concurrent misses for the same book may both
//! call the normalizer; the later write wins.

use tracing::instrument;

use violet_pages_core::VolumeId;

use super::ServiceError;
use crate::ports::{DescriptionCache, TextNormalizer};

/// Instruction given to the normalizer for every description.
pub const NORMALIZE_INSTRUCTION: &str = "Edit the following text such that it follows standard grammar. Remove extra characters, remove markdown tags, remove unnecessary hyphens, use proper capitalization, and fix the punctuation. Make sure it follows a clean and correct writing style.";

/// Return the normalized description of `book`.
///
/// # Errors
///
/// - `ServiceError::BadRequest` on a cache miss with a blank `raw_description`
/// - `ServiceError::Cache` / `ServiceError::Normalizer` if a collaborator fails
#[instrument(skip(cache, normalizer, book, raw_description), fields(volume_id = %book))]
pub async fn get_description(
    cache: &dyn DescriptionCache,
    normalizer: &dyn TextNormalizer,
    book: &VolumeId,
    raw_description: &str,
) -> Result<String, ServiceError> {
    if let Some(cached) = cache.get(book).await? {
        tracing::debug!("Description cache hit");
        return Ok(cached);
    }

    let raw = raw_description.trim();
    if raw.is_empty() {
        return Err(ServiceError::BadRequest(
            "Description cannot be empty".to_string(),
        ));
    }

    let normalized = normalizer.normalize(NORMALIZE_INSTRUCTION, raw).await?;
    cache.put(book, &normalized).await?;
    tracing::info!(len = normalized.len(), "Cached normalized description");

    Ok(normalized)
}
