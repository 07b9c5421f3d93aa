//! List CRUD, visibility and ownership.

#![allow(clippy::unwrap_used)]

use violet_pages_core::{ListName, UserId};
use violet_pages_integration_tests::{FakeCatalog, InMemoryLibrary, vid};
use violet_pages_server::models::{ListChanges, NewList};
use violet_pages_server::services::ServiceError;
use violet_pages_server::services::lists::{
    create_list, delete_list, list_info, lists_of, public_lists_of, update_list, view_list,
};
use violet_pages_server::services::membership::reconcile_membership;

const ALICE: UserId = UserId::new(1);
const BOB: UserId = UserId::new(2);

fn new_list(name: &str, is_public: bool) -> NewList {
    NewList {
        name: ListName::parse(name).unwrap(),
        description: String::new(),
        is_public,
    }
}

#[tokio::test]
async fn test_duplicate_name_conflicts_per_owner() {
    let store = InMemoryLibrary::new();

    create_list(&store, ALICE, &new_list("Favourites", true))
        .await
        .unwrap();
    let again = create_list(&store, ALICE, &new_list("Favourites", false)).await;
    let other_owner = create_list(&store, BOB, &new_list("Favourites", false)).await;

    assert!(matches!(again, Err(ServiceError::Conflict(ref m)) if m == "List name already taken!"));
    assert!(other_owner.is_ok());
}

#[tokio::test]
async fn test_lists_newest_first() {
    let store = InMemoryLibrary::new();
    for name in ["first", "second", "third"] {
        create_list(&store, ALICE, &new_list(name, false))
            .await
            .unwrap();
    }

    let names: Vec<String> = lists_of(&store, ALICE)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();

    assert_eq!(names, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_private_list_hidden_from_others() {
    let store = InMemoryLibrary::new();
    let private = store.seed_list(ALICE, "Secret", false).await;

    let owner_view = view_list(&store, private.id, Some(ALICE)).await.unwrap();
    assert!(owner_view.is_author);

    assert!(matches!(
        view_list(&store, private.id, Some(BOB)).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        view_list(&store, private.id, None).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_public_list_visible_with_books() {
    let store = InMemoryLibrary::new();
    let catalog = FakeCatalog::new().with_volume("bookX", "Piranesi", &["Susanna Clarke"]);
    let shelf = store.seed_list(ALICE, "Shelf", true).await;
    reconcile_membership(&store, &catalog, &vid("bookX"), ALICE, &[shelf.id])
        .await
        .unwrap();

    let view = view_list(&store, shelf.id, None).await.unwrap();

    assert!(!view.is_author);
    assert_eq!(view.list.books.len(), 1);
    assert_eq!(view.list.books[0].book.title, "Piranesi");
    assert_eq!(view.list.books[0].authors, vec!["Susanna Clarke"]);

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["public"], true);
    assert_eq!(json["isAuthor"], false);
    assert_eq!(json["books"][0]["authors"][0], "Susanna Clarke");
}

#[tokio::test]
async fn test_update_requires_owner() {
    let store = InMemoryLibrary::new();
    let list = store.seed_list(ALICE, "Mine", false).await;
    let changes = ListChanges {
        is_public: Some(true),
        ..ListChanges::default()
    };

    assert!(matches!(
        update_list(&store, list.id, BOB, &changes).await,
        Err(ServiceError::Forbidden(_))
    ));

    let updated = update_list(&store, list.id, ALICE, &changes).await.unwrap();
    assert!(updated.is_public);
    assert_eq!(updated.name, "Mine");
}

#[tokio::test]
async fn test_rename_to_taken_name_conflicts() {
    let store = InMemoryLibrary::new();
    store.seed_list(ALICE, "Taken", false).await;
    let list = store.seed_list(ALICE, "Other", false).await;
    let changes = ListChanges {
        name: Some(ListName::parse("Taken").unwrap()),
        ..ListChanges::default()
    };

    assert!(matches!(
        update_list(&store, list.id, ALICE, &changes).await,
        Err(ServiceError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_delete_cascades_edges_and_keeps_books() {
    let store = InMemoryLibrary::new();
    let catalog = FakeCatalog::new().with_volume("bookX", "Piranesi", &[]);
    let list = store.seed_list(ALICE, "Gone soon", false).await;
    reconcile_membership(&store, &catalog, &vid("bookX"), ALICE, &[list.id])
        .await
        .unwrap();

    assert!(matches!(
        delete_list(&store, list.id, BOB).await,
        Err(ServiceError::Forbidden(_))
    ));

    delete_list(&store, list.id, ALICE).await.unwrap();

    assert!(store.edges().await.is_empty());
    assert_eq!(store.book_count().await, 1);
    assert!(matches!(
        view_list(&store, list.id, Some(ALICE)).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_info_and_public_lists() {
    let store = InMemoryLibrary::new();
    store.seed_list(ALICE, "one", true).await;
    store.seed_list(ALICE, "two", false).await;
    store.seed_list(ALICE, "three", true).await;
    store.seed_list(BOB, "bob's", true).await;

    let info = list_info(&store, ALICE).await.unwrap();
    assert_eq!(info.total_lists, 3);
    assert_eq!(info.public_lists, 2);
    assert_eq!(info.private_lists, 1);

    let public: Vec<String> = public_lists_of(&store, ALICE)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(public, vec!["three", "one"]);
}
