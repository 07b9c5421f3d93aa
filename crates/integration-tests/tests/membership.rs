//! List membership reconciliation against in-memory collaborators.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use violet_pages_core::{ListId, UserId};
use violet_pages_integration_tests::{FakeCatalog, InMemoryLibrary, vid};
use violet_pages_server::models::ListMembership;
use violet_pages_server::ports::LibraryStore;
use violet_pages_server::services::ServiceError;
use violet_pages_server::services::membership::{
    get_membership, reconcile_membership, remove_from_list,
};

const ALICE: UserId = UserId::new(1);
const BOB: UserId = UserId::new(2);

fn catalog() -> FakeCatalog {
    FakeCatalog::new()
        .with_volume("bookX", "The Left Hand of Darkness", &["Ursula K. Le Guin"])
        .with_volume("bookY", "Kindred", &["Octavia E. Butler"])
}

fn holding(view: &[ListMembership]) -> BTreeSet<ListId> {
    view.iter().filter(|m| m.has_book).map(|m| m.list_id).collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_first_add_creates_book_and_edge() {
    let store = InMemoryLibrary::new();
    let catalog = catalog();
    let a = store.seed_list(ALICE, "A", false).await;
    let b = store.seed_list(ALICE, "B", false).await;
    let x = vid("bookX");

    let view = reconcile_membership(&store, &catalog, &x, ALICE, &[a.id])
        .await
        .unwrap();

    // Newest list first
    assert_eq!(
        view,
        vec![
            ListMembership {
                list_id: b.id,
                name: "B".to_string(),
                has_book: false
            },
            ListMembership {
                list_id: a.id,
                name: "A".to_string(),
                has_book: true
            },
        ]
    );

    let stored = store.book(&x).await.unwrap();
    assert_eq!(stored.book.title, "The Left Hand of Darkness");
    assert_eq!(stored.authors, vec!["Ursula K. Le Guin".to_string()]);
    assert_eq!(store.edges().await, BTreeSet::from([(a.id, x)]));
    assert_eq!(catalog.volume_calls(), 1);
}

#[tokio::test]
async fn test_result_matches_desired_set() {
    let store = InMemoryLibrary::new();
    let catalog = catalog();
    let a = store.seed_list(ALICE, "A", false).await;
    let b = store.seed_list(ALICE, "B", true).await;
    let c = store.seed_list(ALICE, "C", false).await;
    let x = vid("bookX");

    let cases: [&[ListId]; 5] = [
        &[a.id, b.id],
        &[c.id],
        &[],
        &[a.id, b.id, c.id],
        &[b.id, b.id],
    ];

    for desired in cases {
        let view = reconcile_membership(&store, &catalog, &x, ALICE, desired)
            .await
            .unwrap();
        let expected: BTreeSet<ListId> = desired.iter().copied().collect();
        assert_eq!(holding(&view), expected);
        assert_eq!(store.lists_containing(&x, ALICE).await.unwrap(), expected);
    }

    // Book row created once even though it was added several times
    assert_eq!(catalog.volume_calls(), 1);
    assert_eq!(store.book_count().await, 1);
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let store = InMemoryLibrary::new();
    let catalog = catalog();
    let a = store.seed_list(ALICE, "A", false).await;
    store.seed_list(ALICE, "B", false).await;
    let x = vid("bookX");

    let first = reconcile_membership(&store, &catalog, &x, ALICE, &[a.id])
        .await
        .unwrap();
    let edges = store.edges().await;
    let mutations = store.mutations();

    let second = reconcile_membership(&store, &catalog, &x, ALICE, &[a.id])
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(store.edges().await, edges);
    // Nothing left to add or remove
    assert_eq!(store.mutations(), mutations);
}

#[tokio::test]
async fn test_other_users_edges_untouched() {
    let store = InMemoryLibrary::new();
    let catalog = catalog();
    let mine = store.seed_list(ALICE, "Mine", false).await;
    let theirs = store.seed_list(BOB, "Theirs", false).await;
    let x = vid("bookX");

    reconcile_membership(&store, &catalog, &x, BOB, &[theirs.id])
        .await
        .unwrap();
    reconcile_membership(&store, &catalog, &x, ALICE, &[mine.id])
        .await
        .unwrap();
    reconcile_membership(&store, &catalog, &x, ALICE, &[])
        .await
        .unwrap();

    assert_eq!(store.edges().await, BTreeSet::from([(theirs.id, x)]));
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn test_unknown_list_is_not_found_without_mutation() {
    let store = InMemoryLibrary::new();
    let catalog = catalog();
    let a = store.seed_list(ALICE, "A", false).await;
    let x = vid("bookX");

    let result =
        reconcile_membership(&store, &catalog, &x, ALICE, &[a.id, ListId::new(999)]).await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
    assert_eq!(store.mutations(), 0);
    assert_eq!(catalog.volume_calls(), 0);
    assert!(store.edges().await.is_empty());
}

#[tokio::test]
async fn test_foreign_list_is_forbidden_without_mutation() {
    let store = InMemoryLibrary::new();
    let catalog = catalog();
    let a = store.seed_list(ALICE, "A", false).await;
    let foreign = store.seed_list(BOB, "B", true).await;
    let x = vid("bookX");

    let result = reconcile_membership(&store, &catalog, &x, ALICE, &[a.id, foreign.id]).await;

    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    assert_eq!(store.mutations(), 0);
    assert!(store.edges().await.is_empty());
}

#[tokio::test]
async fn test_unknown_volume_fails_before_edges() {
    let store = InMemoryLibrary::new();
    let catalog = FakeCatalog::new();
    let a = store.seed_list(ALICE, "A", false).await;

    let result = reconcile_membership(&store, &catalog, &vid("missing"), ALICE, &[a.id]).await;

    assert!(matches!(result, Err(ServiceError::Catalog(_))));
    assert!(store.edges().await.is_empty());
    assert_eq!(store.book_count().await, 0);
}

// =============================================================================
// Catalog usage
// =============================================================================

#[tokio::test]
async fn test_catalog_not_called_when_book_stored() {
    let store = InMemoryLibrary::new();
    let catalog = catalog();
    let a = store.seed_list(ALICE, "A", false).await;
    let b = store.seed_list(ALICE, "B", false).await;
    let x = vid("bookX");

    reconcile_membership(&store, &catalog, &x, BOB, &[])
        .await
        .unwrap();
    reconcile_membership(&store, &catalog, &x, ALICE, &[a.id])
        .await
        .unwrap();
    assert_eq!(catalog.volume_calls(), 1);

    reconcile_membership(&store, &catalog, &x, ALICE, &[a.id, b.id])
        .await
        .unwrap();
    assert_eq!(catalog.volume_calls(), 1);
}

#[tokio::test]
async fn test_removing_only_never_fetches() {
    let store = InMemoryLibrary::new();
    let catalog = catalog();
    store.seed_list(ALICE, "A", false).await;

    let view = reconcile_membership(&store, &catalog, &vid("bookY"), ALICE, &[])
        .await
        .unwrap();

    assert!(holding(&view).is_empty());
    assert_eq!(catalog.volume_calls(), 0);
    assert_eq!(store.book_count().await, 0);
}

#[tokio::test]
async fn test_book_stored_under_requested_id_when_catalog_answers_another() {
    let store = InMemoryLibrary::new();
    let catalog = FakeCatalog::new().with_aliased_volume("requestedId", "canonicalId", "Beloved");
    let a = store.seed_list(ALICE, "A", false).await;
    let requested = vid("requestedId");

    let view = reconcile_membership(&store, &catalog, &requested, ALICE, &[a.id])
        .await
        .unwrap();

    assert_eq!(holding(&view), BTreeSet::from([a.id]));
    assert_eq!(store.edges().await, BTreeSet::from([(a.id, requested.clone())]));
    let stored = store.book(&requested).await.unwrap();
    assert_eq!(stored.book.id, requested);
    assert_eq!(stored.book.title, "Beloved");
    assert!(store.book(&vid("canonicalId")).await.is_none());
}

// =============================================================================
// get_membership / remove_from_list
// =============================================================================

#[tokio::test]
async fn test_membership_of_unknown_book_is_all_false() {
    let store = InMemoryLibrary::new();
    store.seed_list(ALICE, "A", false).await;
    store.seed_list(ALICE, "B", false).await;

    let view = get_membership(&store, &vid("bookX"), ALICE).await.unwrap();

    assert_eq!(view.len(), 2);
    assert!(view.iter().all(|m| !m.has_book));
}

#[tokio::test]
async fn test_remove_from_own_list() {
    let store = InMemoryLibrary::new();
    let catalog = catalog();
    let a = store.seed_list(ALICE, "A", false).await;
    let x = vid("bookX");
    let y = vid("bookY");
    reconcile_membership(&store, &catalog, &x, ALICE, &[a.id])
        .await
        .unwrap();
    reconcile_membership(&store, &catalog, &y, ALICE, &[a.id])
        .await
        .unwrap();

    let list = remove_from_list(&store, &x, a.id, ALICE).await.unwrap();

    assert_eq!(list.list.id, a.id);
    assert_eq!(list.books.len(), 1);
    assert_eq!(list.books[0].book.id, y);
    // The book row stays for other lists
    assert!(store.book(&x).await.is_some());
}

#[tokio::test]
async fn test_remove_from_foreign_list_is_forbidden_and_changes_nothing() {
    let store = InMemoryLibrary::new();
    let catalog = catalog();
    let theirs = store.seed_list(BOB, "Theirs", false).await;
    let x = vid("bookX");
    reconcile_membership(&store, &catalog, &x, BOB, &[theirs.id])
        .await
        .unwrap();
    let edges = store.edges().await;
    let mutations = store.mutations();

    let result = remove_from_list(&store, &x, theirs.id, ALICE).await;

    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    assert_eq!(store.edges().await, edges);
    assert_eq!(store.mutations(), mutations);
}

#[tokio::test]
async fn test_remove_unknown_book_is_not_found() {
    let store = InMemoryLibrary::new();
    let a = store.seed_list(ALICE, "A", false).await;

    let result = remove_from_list(&store, &vid("nowhere"), a.id, ALICE).await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
