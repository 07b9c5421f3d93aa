//! List CRUD and visibility rules.

use tracing::instrument;

use violet_pages_core::{ListId, UserId};

use super::ServiceError;
use crate::db::RepositoryError;
use crate::models::{List, ListChanges, ListDetail, ListInfo, ListWithBooks, NewList};
use crate::ports::LibraryStore;

const NAME_TAKEN: &str = "List name already taken!";

/// Create a list for `owner`.
///
/// # Errors
///
/// Returns `ServiceError::Conflict` if the owner already has a list with
/// this name.
#[instrument(skip(store, list), fields(name = %list.name))]
pub async fn create_list(
    store: &dyn LibraryStore,
    owner: UserId,
    list: &NewList,
) -> Result<List, ServiceError> {
    store
        .create_list(owner, list)
        .await
        .map_err(name_conflict)
}

/// The owner's lists, newest first.
///
/// # Errors
///
/// Returns `ServiceError::Repository` if the store fails.
pub async fn lists_of(store: &dyn LibraryStore, owner: UserId) -> Result<Vec<List>, ServiceError> {
    Ok(store.lists_owned_by(owner).await?)
}

/// The owner's public lists, newest first.
///
/// # Errors
///
/// Returns `ServiceError::Repository` if the store fails.
pub async fn public_lists_of(
    store: &dyn LibraryStore,
    owner: UserId,
) -> Result<Vec<List>, ServiceError> {
    let mut lists = store.lists_owned_by(owner).await?;
    lists.retain(|l| l.is_public);
    Ok(lists)
}

/// Public/private counts for the owner's lists.
///
/// # Errors
///
/// Returns `ServiceError::Repository` if the store fails.
pub async fn list_info(store: &dyn LibraryStore, owner: UserId) -> Result<ListInfo, ServiceError> {
    let lists = store.lists_owned_by(owner).await?;
    Ok(ListInfo::from_lists(&lists))
}

/// A list with its books as seen by `viewer`.
///
/// Private lists are visible to their owner only; anyone else gets
/// `NotFound`, exactly as for a missing list.
///
/// # Errors
///
/// Returns `ServiceError::NotFound` if the list is absent or hidden.
#[instrument(skip(store))]
pub async fn view_list(
    store: &dyn LibraryStore,
    id: ListId,
    viewer: Option<UserId>,
) -> Result<ListDetail, ServiceError> {
    let not_found = || ServiceError::NotFound(format!("List {id} not found"));

    let list = store.find_list(id).await?.ok_or_else(not_found)?;
    let is_author = viewer == Some(list.author_id);
    if !list.is_public && !is_author {
        return Err(not_found());
    }

    let books = store.books_in_list(id).await?;
    Ok(ListDetail {
        list: ListWithBooks { list, books },
        is_author,
    })
}

/// Update one of the caller's lists.
///
/// # Errors
///
/// - `ServiceError::NotFound` if the list does not exist
/// - `ServiceError::Forbidden` if the caller does not own it
/// - `ServiceError::Conflict` if the new name is already used by the caller
#[instrument(skip(store, changes))]
pub async fn update_list(
    store: &dyn LibraryStore,
    id: ListId,
    caller: UserId,
    changes: &ListChanges,
) -> Result<List, ServiceError> {
    owned_list(store, id, caller).await?;
    store.update_list(id, changes).await.map_err(name_conflict)
}

/// Delete one of the caller's lists. Books stay in the catalog snapshot.
///
/// # Errors
///
/// - `ServiceError::NotFound` if the list does not exist
/// - `ServiceError::Forbidden` if the caller does not own it
#[instrument(skip(store))]
pub async fn delete_list(
    store: &dyn LibraryStore,
    id: ListId,
    caller: UserId,
) -> Result<List, ServiceError> {
    let list = owned_list(store, id, caller).await?;
    store.delete_list(id).await?;
    tracing::info!("Deleted list");
    Ok(list)
}

async fn owned_list(
    store: &dyn LibraryStore,
    id: ListId,
    caller: UserId,
) -> Result<List, ServiceError> {
    let list = store
        .find_list(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("List {id} not found")))?;
    if list.author_id != caller {
        return Err(ServiceError::Forbidden(format!(
            "List {id} belongs to another user"
        )));
    }
    Ok(list)
}

fn name_conflict(e: RepositoryError) -> ServiceError {
    match e {
        RepositoryError::Conflict(_) => ServiceError::Conflict(NAME_TAKEN.to_string()),
        RepositoryError::NotFound => ServiceError::NotFound("List not found".to_string()),
        other => ServiceError::Repository(other),
    }
}
