//! Seams between the services and their collaborators.
//!
//! `PostgreSQL`, Google Books, Redis and `OpenAI` adapters implement these
//! traits; the integration tests swap in in-memory implementations.

use std::collections::BTreeSet;

use async_trait::async_trait;

use violet_pages_core::{ListId, UserId, VolumeId};

use crate::catalog::{CatalogError, Volume, VolumeSearch};
use crate::db::RepositoryError;
use crate::description_cache::CacheError;
use crate::models::{BookWithAuthors, List, ListChanges, NewList, Search};
use crate::openai::NormalizerError;

/// Lists, books and membership edges.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// All lists owned by `owner`, newest first (`created_at DESC, id DESC`).
    async fn lists_owned_by(&self, owner: UserId) -> Result<Vec<List>, RepositoryError>;

    async fn find_list(&self, id: ListId) -> Result<Option<List>, RepositoryError>;

    async fn book_exists(&self, id: &VolumeId) -> Result<bool, RepositoryError>;

    /// Ids of the lists owned by `owner` that contain `book`.
    async fn lists_containing(
        &self,
        book: &VolumeId,
        owner: UserId,
    ) -> Result<BTreeSet<ListId>, RepositoryError>;

    /// Insert the book and its authors unless a row with the same id exists.
    async fn insert_book_if_absent(&self, book: &BookWithAuthors) -> Result<(), RepositoryError>;

    /// Add a membership edge. Adding an existing edge is a no-op.
    async fn add_edge(&self, list: ListId, book: &VolumeId) -> Result<(), RepositoryError>;

    /// Remove a membership edge. Removing a missing edge is a no-op.
    async fn remove_edge(&self, list: ListId, book: &VolumeId) -> Result<(), RepositoryError>;

    /// Books in a list with their authors, most recently added first.
    async fn books_in_list(&self, list: ListId) -> Result<Vec<BookWithAuthors>, RepositoryError>;

    /// Create a list. A duplicate name for the same owner is `Conflict`.
    async fn create_list(&self, owner: UserId, list: &NewList) -> Result<List, RepositoryError>;

    /// Apply changes to a list. `NotFound` if absent, `Conflict` on duplicate name.
    async fn update_list(&self, id: ListId, changes: &ListChanges)
    -> Result<List, RepositoryError>;

    /// Delete a list and its membership edges. Books are kept.
    async fn delete_list(&self, id: ListId) -> Result<(), RepositoryError>;
}

/// Per-user recent search queries.
#[async_trait]
pub trait SearchHistoryStore: Send + Sync {
    /// The user's searches, most recent first.
    async fn history(&self, user: UserId) -> Result<Vec<Search>, RepositoryError>;

    /// Record `query` atomically, keeping at most five rows for the user.
    ///
    /// `query` is already trimmed and non-empty.
    async fn record(&self, user: UserId, query: &str) -> Result<Search, RepositoryError>;
}

/// Read-only book catalog.
#[async_trait]
pub trait BookCatalog: Send + Sync {
    async fn volume(&self, id: &VolumeId) -> Result<Volume, CatalogError>;

    async fn search(&self, query: &str, start_index: u32) -> Result<VolumeSearch, CatalogError>;
}

/// Normalized description storage keyed by volume id.
#[async_trait]
pub trait DescriptionCache: Send + Sync {
    async fn get(&self, book: &VolumeId) -> Result<Option<String>, CacheError>;

    async fn put(&self, book: &VolumeId, text: &str) -> Result<(), CacheError>;

    /// Remove a cached description. Returns whether an entry existed.
    async fn evict(&self, book: &VolumeId) -> Result<bool, CacheError>;
}

/// Language-model text cleanup.
#[async_trait]
pub trait TextNormalizer: Send + Sync {
    async fn normalize(&self, instruction: &str, text: &str) -> Result<String, NormalizerError>;
}
