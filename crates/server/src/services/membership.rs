//! List membership coordinator.
//!
//! Reconciles the set of the caller's lists that should contain a book with
//! the set that currently does, creating the `books`/`book_authors` rows the
//! first time a book gains a list. Book and author rows are only ever created
//! here.

use std::collections::BTreeSet;

use tracing::instrument;

use violet_pages_core::{ListId, UserId, VolumeId};

use super::ServiceError;
use crate::models::{List, ListMembership, ListWithBooks};
use crate::ports::{BookCatalog, LibraryStore};

/// Edge changes needed to reach the desired membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipPlan {
    pub add: Vec<ListId>,
    pub remove: Vec<ListId>,
}

impl MembershipPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Compute the edges to add and remove over the caller's `owned` lists.
///
/// Ids in `desired` that are not in `owned` are ignored; callers check
/// ownership before planning.
#[must_use]
pub fn plan_reconciliation(
    owned: &[ListId],
    current: &BTreeSet<ListId>,
    desired: &BTreeSet<ListId>,
) -> MembershipPlan {
    let mut plan = MembershipPlan::default();
    for id in owned {
        match (desired.contains(id), current.contains(id)) {
            (true, false) => plan.add.push(*id),
            (false, true) => plan.remove.push(*id),
            _ => {}
        }
    }
    plan
}

/// Membership of `book` across all of `caller`'s lists.
///
/// # Errors
///
/// Returns `ServiceError::Repository` if the store fails.
#[instrument(skip(store, book), fields(volume_id = %book))]
pub async fn get_membership(
    store: &dyn LibraryStore,
    book: &VolumeId,
    caller: UserId,
) -> Result<Vec<ListMembership>, ServiceError> {
    let lists = store.lists_owned_by(caller).await?;

    let containing = if store.book_exists(book).await? {
        store.lists_containing(book, caller).await?
    } else {
        BTreeSet::new()
    };

    Ok(membership_view(&lists, &containing))
}

/// Make exactly the lists in `desired` (among the caller's) contain `book`.
///
/// Every requested id is resolved before anything is written. The catalog is
/// consulted at most once, and only when a list gains the book and no `books`
/// row exists yet.
///
/// # Errors
///
/// - `ServiceError::NotFound` if a requested list does not exist
/// - `ServiceError::Forbidden` if a requested list belongs to someone else
/// - `ServiceError::Catalog` if the book has to be fetched and the lookup fails
#[instrument(skip(store, catalog, book, desired), fields(volume_id = %book, desired = desired.len()))]
pub async fn reconcile_membership(
    store: &dyn LibraryStore,
    catalog: &dyn BookCatalog,
    book: &VolumeId,
    caller: UserId,
    desired: &[ListId],
) -> Result<Vec<ListMembership>, ServiceError> {
    let desired: BTreeSet<ListId> = desired.iter().copied().collect();

    for id in &desired {
        let list = store
            .find_list(*id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("List {id} not found")))?;
        if list.author_id != caller {
            return Err(ServiceError::Forbidden(format!(
                "List {id} belongs to another user"
            )));
        }
    }

    let lists = store.lists_owned_by(caller).await?;
    let owned: Vec<ListId> = lists.iter().map(|l| l.id).collect();
    let book_exists = store.book_exists(book).await?;
    let current = if book_exists {
        store.lists_containing(book, caller).await?
    } else {
        BTreeSet::new()
    };

    let plan = plan_reconciliation(&owned, &current, &desired);

    if !plan.add.is_empty() && !book_exists {
        let volume = catalog.volume(book).await?;
        let mut snapshot = volume.to_book()?;
        // The requested id stays the natural key
        if snapshot.book.id != *book {
            tracing::warn!(
                returned = %snapshot.book.id,
                "Catalog returned a different volume id"
            );
            snapshot.book.id = book.clone();
        }
        store.insert_book_if_absent(&snapshot).await?;
        tracing::info!(title = %snapshot.book.title, "Stored new book");
    }

    for id in &plan.add {
        store.add_edge(*id, book).await?;
    }
    for id in &plan.remove {
        store.remove_edge(*id, book).await?;
    }

    if !plan.is_empty() {
        tracing::info!(
            added = plan.add.len(),
            removed = plan.remove.len(),
            "Reconciled list membership"
        );
    }

    let containing = store.lists_containing(book, caller).await?;
    Ok(membership_view(&lists, &containing))
}

/// Remove `book` from one of the caller's lists.
///
/// # Errors
///
/// - `ServiceError::NotFound` if the book or the list does not exist
/// - `ServiceError::Forbidden` if the list belongs to someone else
#[instrument(skip(store, book), fields(volume_id = %book))]
pub async fn remove_from_list(
    store: &dyn LibraryStore,
    book: &VolumeId,
    list: ListId,
    caller: UserId,
) -> Result<ListWithBooks, ServiceError> {
    if !store.book_exists(book).await? {
        return Err(ServiceError::NotFound(format!("Book {book} not found")));
    }

    let found = store
        .find_list(list)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("List {list} not found")))?;
    if found.author_id != caller {
        return Err(ServiceError::Forbidden(format!(
            "List {list} belongs to another user"
        )));
    }

    store.remove_edge(list, book).await?;

    let books = store.books_in_list(list).await?;
    Ok(ListWithBooks { list: found, books })
}

fn membership_view(lists: &[List], containing: &BTreeSet<ListId>) -> Vec<ListMembership> {
    lists
        .iter()
        .map(|l| ListMembership {
            list_id: l.id,
            name: l.name.clone(),
            has_book: containing.contains(&l.id),
        })
        .collect()
}
