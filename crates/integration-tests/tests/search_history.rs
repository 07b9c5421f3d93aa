//! Search history ring.

#![allow(clippy::unwrap_used)]

use violet_pages_core::UserId;
use violet_pages_integration_tests::InMemorySearchHistory;
use violet_pages_server::services::ServiceError;
use violet_pages_server::services::search_history::{MAX_SEARCHES, get_history, record_search};

const USER: UserId = UserId::new(7);

async fn queries(store: &InMemorySearchHistory, user: UserId) -> Vec<String> {
    get_history(store, user)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.query)
        .collect()
}

#[tokio::test]
async fn test_sixth_query_evicts_oldest() {
    let store = InMemorySearchHistory::new();
    for q in ["dune", "emma", "ulysses", "beloved", "middlemarch"] {
        record_search(&store, USER, q).await.unwrap();
    }

    record_search(&store, USER, "solaris").await.unwrap();

    assert_eq!(
        queries(&store, USER).await,
        vec!["solaris", "middlemarch", "beloved", "ulysses", "emma"]
    );
}

#[tokio::test]
async fn test_repeat_query_moves_to_front_without_duplicate() {
    let store = InMemorySearchHistory::new();
    for q in ["dune", "emma", "ulysses"] {
        record_search(&store, USER, q).await.unwrap();
    }

    let touched = record_search(&store, USER, "dune").await.unwrap();

    assert_eq!(touched.query, "dune");
    assert_eq!(queries(&store, USER).await, vec!["dune", "ulysses", "emma"]);
}

#[tokio::test]
async fn test_never_more_than_five_and_latest_kept() {
    let store = InMemorySearchHistory::new();
    let sequence = [
        "a", "b", "c", "a", "d", "e", "f", "b", "g", "a", "h", "h", "i", "c",
    ];

    for q in sequence {
        record_search(&store, USER, q).await.unwrap();
        let history = queries(&store, USER).await;
        assert!(history.len() <= MAX_SEARCHES);
        assert_eq!(history.first().map(String::as_str), Some(q));
    }
}

#[tokio::test]
async fn test_query_is_trimmed_and_blank_rejected() {
    let store = InMemorySearchHistory::new();

    let search = record_search(&store, USER, "  dune  ").await.unwrap();
    assert_eq!(search.query, "dune");

    let result = record_search(&store, USER, "   ").await;
    assert!(matches!(result, Err(ServiceError::BadRequest(_))));
    assert_eq!(queries(&store, USER).await, vec!["dune"]);
}

#[tokio::test]
async fn test_users_have_separate_histories() {
    let store = InMemorySearchHistory::new();
    let other = UserId::new(8);
    for q in ["a", "b", "c", "d", "e"] {
        record_search(&store, USER, q).await.unwrap();
    }
    record_search(&store, other, "z").await.unwrap();

    assert_eq!(queries(&store, USER).await.len(), 5);
    assert_eq!(queries(&store, other).await, vec!["z"]);
}
