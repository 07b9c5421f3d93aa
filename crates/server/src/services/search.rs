//! Catalog lookups: search result pages and single volumes.

use tracing::instrument;

use violet_pages_core::VolumeId;

use super::ServiceError;
use crate::catalog::client::PAGE_SIZE;
use crate::catalog::{CatalogError, Volume, VolumeSearch};
use crate::ports::BookCatalog;

/// Catalog offset of the first result on a 1-based `page`.
///
/// # Errors
///
/// Returns `ServiceError::BadRequest` for page 0 or an offset that overflows.
pub fn start_index(page: u32) -> Result<u32, ServiceError> {
    page.checked_sub(1)
        .and_then(|p| p.checked_mul(PAGE_SIZE))
        .ok_or_else(|| ServiceError::BadRequest("Page must be at least 1".to_string()))
}

/// Fetch one page of search results.
///
/// # Errors
///
/// - `ServiceError::BadRequest` for a blank query, page 0, or a response the
///   catalog could not produce cleanly
/// - `ServiceError::NotFound` when the catalog reports no items
#[instrument(skip(catalog))]
pub async fn results_page(
    catalog: &dyn BookCatalog,
    query: &str,
    page: u32,
) -> Result<VolumeSearch, ServiceError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ServiceError::BadRequest(
            "Search query cannot be empty".to_string(),
        ));
    }
    let start = start_index(page)?;

    let results = match catalog.search(query, start).await {
        Ok(results) => results,
        Err(CatalogError::Malformed(message)) => return Err(ServiceError::BadRequest(message)),
        Err(e) => return Err(e.into()),
    };

    if results.items.is_empty() {
        return Err(ServiceError::NotFound(format!("No books found for {query:?}")));
    }

    Ok(results)
}

/// Look up one volume for the book page.
///
/// # Errors
///
/// Returns `ServiceError::Catalog`; an unknown id surfaces as not found.
#[instrument(skip(catalog, id), fields(volume_id = %id))]
pub async fn volume(catalog: &dyn BookCatalog, id: &VolumeId) -> Result<Volume, ServiceError> {
    Ok(catalog.volume(id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_index() {
        assert!(matches!(start_index(1), Ok(0)));
        assert!(matches!(start_index(2), Ok(10)));
        assert!(matches!(start_index(7), Ok(60)));
    }

    #[test]
    fn test_page_zero_rejected() {
        assert!(matches!(start_index(0), Err(ServiceError::BadRequest(_))));
    }

    #[test]
    fn test_huge_page_rejected() {
        assert!(matches!(start_index(u32::MAX), Err(ServiceError::BadRequest(_))));
    }
}
