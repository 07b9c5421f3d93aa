//! Integration tests for Violet Pages.
//!
//! The services in `violet_pages_server::services` reach storage, the
//! catalog, the cache and the normalizer only through the traits in
//! `violet_pages_server::ports`. This crate provides in-memory versions of
//! each so the tests in `tests/` run without `PostgreSQL`, Redis or network
//! access.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p violet-pages-integration-tests
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use violet_pages_core::{ListId, ListName, SearchId, UserId, VolumeId};
use violet_pages_server::catalog::{CatalogError, Volume, VolumeInfo, VolumeSearch};
use violet_pages_server::db::RepositoryError;
use violet_pages_server::description_cache::CacheError;
use violet_pages_server::models::{BookWithAuthors, List, ListChanges, NewList, Search};
use violet_pages_server::openai::NormalizerError;
use violet_pages_server::ports::{
    BookCatalog, DescriptionCache, LibraryStore, SearchHistoryStore, TextNormalizer,
};
use violet_pages_server::services::search_history::{RecordPlan, plan_record};

/// Deterministic clock: every tick is one second after the last.
#[derive(Debug, Default)]
struct Clock(i64);

impl Clock {
    fn tick(&mut self) -> DateTime<Utc> {
        self.0 += 1;
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
            + Duration::seconds(self.0)
    }
}

#[derive(Debug, Default)]
struct Library {
    clock: Clock,
    next_list_id: i32,
    lists: BTreeMap<ListId, List>,
    books: BTreeMap<VolumeId, BookWithAuthors>,
    /// Edge -> sequence number of insertion.
    edges: BTreeMap<(ListId, VolumeId), u64>,
    next_edge_seq: u64,
}

/// In-memory [`LibraryStore`].
///
/// Counts every mutating call so tests can assert that a rejected request
/// changed nothing.
#[derive(Debug, Default)]
pub struct InMemoryLibrary {
    inner: Mutex<Library>,
    mutations: AtomicUsize,
}

impl InMemoryLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list directly, bypassing the service layer.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid list name.
    pub async fn seed_list(&self, owner: UserId, name: &str, is_public: bool) -> List {
        let new_list = NewList {
            name: ListName::parse(name).unwrap_or_else(|e| panic!("bad list name {name:?}: {e}")),
            description: String::new(),
            is_public,
        };
        let mut lib = self.inner.lock().await;
        insert_list(&mut lib, owner, &new_list)
    }

    /// Store a book directly, bypassing the service layer.
    pub async fn seed_book(&self, book: BookWithAuthors) {
        let mut lib = self.inner.lock().await;
        lib.books.insert(book.book.id.clone(), book);
    }

    /// Add an edge directly, bypassing the service layer.
    pub async fn seed_edge(&self, list: ListId, book: &VolumeId) {
        let mut lib = self.inner.lock().await;
        insert_edge(&mut lib, list, book);
    }

    /// All membership edges.
    pub async fn edges(&self) -> BTreeSet<(ListId, VolumeId)> {
        self.inner.lock().await.edges.keys().cloned().collect()
    }

    /// The stored snapshot of a book, if any.
    pub async fn book(&self, id: &VolumeId) -> Option<BookWithAuthors> {
        self.inner.lock().await.books.get(id).cloned()
    }

    /// Number of stored books.
    pub async fn book_count(&self) -> usize {
        self.inner.lock().await.books.len()
    }

    /// Number of mutating calls made through the trait.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn mutated(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }
}

fn insert_list(lib: &mut Library, owner: UserId, new_list: &NewList) -> List {
    lib.next_list_id += 1;
    let now = lib.clock.tick();
    let list = List {
        id: ListId::new(lib.next_list_id),
        author_id: owner,
        name: new_list.name.as_str().to_string(),
        description: new_list.description.clone(),
        is_public: new_list.is_public,
        created_at: now,
        updated_at: now,
    };
    lib.lists.insert(list.id, list.clone());
    list
}

fn insert_edge(lib: &mut Library, list: ListId, book: &VolumeId) {
    let key = (list, book.clone());
    if !lib.edges.contains_key(&key) {
        lib.next_edge_seq += 1;
        let seq = lib.next_edge_seq;
        lib.edges.insert(key, seq);
    }
}

fn name_taken(lib: &Library, owner: UserId, name: &str, except: Option<ListId>) -> bool {
    lib.lists
        .values()
        .any(|l| l.author_id == owner && l.name == name && Some(l.id) != except)
}

#[async_trait]
impl LibraryStore for InMemoryLibrary {
    async fn lists_owned_by(&self, owner: UserId) -> Result<Vec<List>, RepositoryError> {
        let lib = self.inner.lock().await;
        let mut lists: Vec<List> = lib
            .lists
            .values()
            .filter(|l| l.author_id == owner)
            .cloned()
            .collect();
        lists.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(lists)
    }

    async fn find_list(&self, id: ListId) -> Result<Option<List>, RepositoryError> {
        Ok(self.inner.lock().await.lists.get(&id).cloned())
    }

    async fn book_exists(&self, id: &VolumeId) -> Result<bool, RepositoryError> {
        Ok(self.inner.lock().await.books.contains_key(id))
    }

    async fn lists_containing(
        &self,
        book: &VolumeId,
        owner: UserId,
    ) -> Result<BTreeSet<ListId>, RepositoryError> {
        let lib = self.inner.lock().await;
        Ok(lib
            .edges
            .keys()
            .filter(|(list, b)| {
                b == book && lib.lists.get(list).is_some_and(|l| l.author_id == owner)
            })
            .map(|(list, _)| *list)
            .collect())
    }

    async fn insert_book_if_absent(&self, book: &BookWithAuthors) -> Result<(), RepositoryError> {
        self.mutated();
        let mut lib = self.inner.lock().await;
        lib.books
            .entry(book.book.id.clone())
            .or_insert_with(|| book.clone());
        Ok(())
    }

    async fn add_edge(&self, list: ListId, book: &VolumeId) -> Result<(), RepositoryError> {
        self.mutated();
        let mut lib = self.inner.lock().await;
        insert_edge(&mut lib, list, book);
        Ok(())
    }

    async fn remove_edge(&self, list: ListId, book: &VolumeId) -> Result<(), RepositoryError> {
        self.mutated();
        let mut lib = self.inner.lock().await;
        lib.edges.remove(&(list, book.clone()));
        Ok(())
    }

    async fn books_in_list(&self, list: ListId) -> Result<Vec<BookWithAuthors>, RepositoryError> {
        let lib = self.inner.lock().await;
        let mut entries: Vec<(u64, &VolumeId)> = lib
            .edges
            .iter()
            .filter(|((l, _), _)| *l == list)
            .map(|((_, book), seq)| (*seq, book))
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(entries
            .into_iter()
            .filter_map(|(_, id)| lib.books.get(id).cloned())
            .collect())
    }

    async fn create_list(&self, owner: UserId, list: &NewList) -> Result<List, RepositoryError> {
        self.mutated();
        let mut lib = self.inner.lock().await;
        if name_taken(&lib, owner, list.name.as_str(), None) {
            return Err(RepositoryError::Conflict("list name already taken".to_string()));
        }
        Ok(insert_list(&mut lib, owner, list))
    }

    async fn update_list(
        &self,
        id: ListId,
        changes: &ListChanges,
    ) -> Result<List, RepositoryError> {
        self.mutated();
        let mut lib = self.inner.lock().await;
        let owner = lib
            .lists
            .get(&id)
            .map(|l| l.author_id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(name) = &changes.name
            && name_taken(&lib, owner, name.as_str(), Some(id))
        {
            return Err(RepositoryError::Conflict("list name already taken".to_string()));
        }

        let now = lib.clock.tick();
        let list = lib.lists.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if let Some(name) = &changes.name {
            list.name = name.as_str().to_string();
        }
        if let Some(description) = &changes.description {
            list.description.clone_from(description);
        }
        if let Some(is_public) = changes.is_public {
            list.is_public = is_public;
        }
        list.updated_at = now;
        Ok(list.clone())
    }

    async fn delete_list(&self, id: ListId) -> Result<(), RepositoryError> {
        self.mutated();
        let mut lib = self.inner.lock().await;
        lib.lists.remove(&id).ok_or(RepositoryError::NotFound)?;
        lib.edges.retain(|(list, _), _| *list != id);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct History {
    clock: Clock,
    next_id: i32,
    rows: HashMap<UserId, Vec<Search>>,
}

/// In-memory [`SearchHistoryStore`] applying the same plan as `PostgreSQL`.
#[derive(Debug, Default)]
pub struct InMemorySearchHistory {
    inner: Mutex<History>,
}

impl InMemorySearchHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchHistoryStore for InMemorySearchHistory {
    async fn history(&self, user: UserId) -> Result<Vec<Search>, RepositoryError> {
        let history = self.inner.lock().await;
        let mut rows = history.rows.get(&user).cloned().unwrap_or_default();
        rows.sort_by(|a, b| (b.searched_at, b.id).cmp(&(a.searched_at, a.id)));
        Ok(rows)
    }

    async fn record(&self, user: UserId, query: &str) -> Result<Search, RepositoryError> {
        let mut history = self.inner.lock().await;
        let now = history.clock.tick();
        let existing = history.rows.get(&user).cloned().unwrap_or_default();

        let search = match plan_record(&existing, query) {
            RecordPlan::Touch(id) => {
                let rows = history.rows.entry(user).or_default();
                let row = rows
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or(RepositoryError::NotFound)?;
                row.searched_at = now;
                row.clone()
            }
            RecordPlan::Insert { evict } => {
                history.next_id += 1;
                let search = Search {
                    id: SearchId::new(history.next_id),
                    user_id: user,
                    query: query.to_string(),
                    searched_at: now,
                };
                let rows = history.rows.entry(user).or_default();
                rows.retain(|s| !evict.contains(&s.id));
                rows.push(search.clone());
                search
            }
        };

        Ok(search)
    }
}

/// In-memory [`BookCatalog`] that counts lookups.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    volumes: HashMap<String, Volume>,
    search_results: Vec<Volume>,
    volume_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

impl FakeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a volume with a title and authors.
    #[must_use]
    pub fn with_volume(mut self, id: &str, title: &str, authors: &[&str]) -> Self {
        self.volumes.insert(id.to_string(), volume(id, title, authors));
        self
    }

    /// Answer lookups of `requested` with a volume carrying `returned` as its id.
    #[must_use]
    pub fn with_aliased_volume(mut self, requested: &str, returned: &str, title: &str) -> Self {
        self.volumes
            .insert(requested.to_string(), volume(returned, title, &[]));
        self
    }

    /// Volumes returned by every search, paged by `start_index`.
    #[must_use]
    pub fn with_search_results(mut self, results: Vec<Volume>) -> Self {
        self.search_results = results;
        self
    }

    #[must_use]
    pub fn volume_calls(&self) -> usize {
        self.volume_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

/// Build a catalog volume.
#[must_use]
pub fn volume(id: &str, title: &str, authors: &[&str]) -> Volume {
    Volume {
        id: id.to_string(),
        volume_info: VolumeInfo {
            title: Some(title.to_string()),
            authors: authors.iter().map(|a| (*a).to_string()).collect(),
            ..VolumeInfo::default()
        },
    }
}

#[async_trait]
impl BookCatalog for FakeCatalog {
    async fn volume(&self, id: &VolumeId) -> Result<Volume, CatalogError> {
        self.volume_calls.fetch_add(1, Ordering::SeqCst);
        self.volumes
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("volume {id}")))
    }

    async fn search(&self, _query: &str, start_index: u32) -> Result<VolumeSearch, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let start = usize::try_from(start_index).unwrap_or(usize::MAX);
        Ok(VolumeSearch {
            total_items: i64::try_from(self.search_results.len()).unwrap_or(i64::MAX),
            items: self
                .search_results
                .iter()
                .skip(start)
                .take(10)
                .cloned()
                .collect(),
        })
    }
}

/// In-memory [`DescriptionCache`].
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<VolumeId, String>>,
    failing: AtomicBool,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Make every call fail as if the cache were unreachable.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Timeout);
        }
        Ok(())
    }
}

#[async_trait]
impl DescriptionCache for MemoryCache {
    async fn get(&self, book: &VolumeId) -> Result<Option<String>, CacheError> {
        self.check()?;
        Ok(self.entries.lock().await.get(book).cloned())
    }

    async fn put(&self, book: &VolumeId, text: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries
            .lock()
            .await
            .insert(book.clone(), text.to_string());
        Ok(())
    }

    async fn evict(&self, book: &VolumeId) -> Result<bool, CacheError> {
        self.check()?;
        Ok(self.entries.lock().await.remove(book).is_some())
    }
}

/// [`TextNormalizer`] that collapses whitespace and records each call.
#[derive(Debug, Default)]
pub struct RecordingNormalizer {
    calls: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl RecordingNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `(instruction, text)` pairs in call order.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }

    /// Make every call fail with an empty completion.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl TextNormalizer for RecordingNormalizer {
    async fn normalize(&self, instruction: &str, text: &str) -> Result<String, NormalizerError> {
        self.calls
            .lock()
            .await
            .push((instruction.to_string(), text.to_string()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(NormalizerError::EmptyCompletion);
        }
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

/// Parse a volume id in tests.
///
/// # Panics
///
/// Panics if `raw` is not a valid volume id.
#[must_use]
pub fn vid(raw: &str) -> VolumeId {
    VolumeId::parse(raw).unwrap_or_else(|e| panic!("bad volume id {raw:?}: {e}"))
}
