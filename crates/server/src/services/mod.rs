//! Application services.
//!
//! Services hold the business rules and reach every collaborator through the
//! traits in [`crate::ports`], so they run unchanged against in-memory
//! implementations.
//!
//! - [`membership`] - book/list membership reconciliation
//! - [`descriptions`] - cached description normalization
//! - [`search_history`] - capped recent-search ring
//! - [`search`] - catalog result pages
//! - [`lists`] - list CRUD and visibility
//! - [`users`] - profile rules

pub mod descriptions;
pub mod lists;
pub mod membership;
pub mod search;
pub mod search_history;
pub mod users;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::db::RepositoryError;
use crate::description_cache::CacheError;
use crate::openai::NormalizerError;

/// Errors raised by services.
///
/// The first four variants are caller errors; the adapter variants surface as
/// internal errors unless they carry a caller-facing meaning (see
/// `AppError`'s conversion).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Normalizer error: {0}")]
    Normalizer(#[from] NormalizerError),
}
