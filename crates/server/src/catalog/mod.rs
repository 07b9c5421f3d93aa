//! Google Books catalog client.
//!
//! # Architecture
//!
//! - Read-only access to `GET /volumes/{id}` and `GET /volumes?q=`
//! - Google Books is the source of truth for book metadata; rows in `books`
//!   are a snapshot taken when a book is first added to a list
//! - In-memory caching of volume lookups via `moka` (5 minute TTL)

pub mod client;
pub mod types;

pub use client::GoogleBooksClient;
pub use types::{ImageLinks, Volume, VolumeInfo, VolumeSearch};

use thiserror::Error;

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog has no such volume, or the search matched nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The catalog answered with data we cannot use.
    #[error("Malformed catalog response: {0}")]
    Malformed(String),

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("Catalog returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },
}
