//! Cached description normalization.

#![allow(clippy::unwrap_used)]

use violet_pages_integration_tests::{MemoryCache, RecordingNormalizer, vid};
use violet_pages_server::error::AppError;
use violet_pages_server::ports::DescriptionCache;
use violet_pages_server::services::ServiceError;
use violet_pages_server::services::descriptions::{NORMALIZE_INSTRUCTION, get_description};

#[tokio::test]
async fn test_miss_normalizes_and_caches() {
    let cache = MemoryCache::new();
    let normalizer = RecordingNormalizer::new();
    let id = vid("zyTCAlFPjgYC");

    let text = get_description(&cache, &normalizer, &id, "  Here   is the\nstory ")
        .await
        .unwrap();

    assert_eq!(text, "Here is the story");
    assert_eq!(cache.get(&id).await.unwrap().as_deref(), Some("Here is the story"));

    let calls = normalizer.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, NORMALIZE_INSTRUCTION);
}

#[tokio::test]
async fn test_hit_ignores_new_raw_description() {
    let cache = MemoryCache::new();
    let normalizer = RecordingNormalizer::new();
    let id = vid("zyTCAlFPjgYC");

    let first = get_description(&cache, &normalizer, &id, "original text")
        .await
        .unwrap();
    let second = get_description(&cache, &normalizer, &id, "something else entirely")
        .await
        .unwrap();
    let third = get_description(&cache, &normalizer, &id, "").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, third);
    assert_eq!(normalizer.calls().await.len(), 1);
}

#[tokio::test]
async fn test_blank_description_on_miss_is_rejected() {
    let cache = MemoryCache::new();
    let normalizer = RecordingNormalizer::new();

    let result = get_description(&cache, &normalizer, &vid("abc"), "   ").await;

    assert!(matches!(result, Err(ServiceError::BadRequest(_))));
    assert!(normalizer.calls().await.is_empty());
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_evicted_description_is_normalized_again() {
    let cache = MemoryCache::new();
    let normalizer = RecordingNormalizer::new();
    let id = vid("abc");

    get_description(&cache, &normalizer, &id, "old").await.unwrap();
    assert!(cache.evict(&id).await.unwrap());
    assert!(!cache.evict(&id).await.unwrap());

    let text = get_description(&cache, &normalizer, &id, "new  text")
        .await
        .unwrap();

    assert_eq!(text, "new text");
    assert_eq!(normalizer.calls().await.len(), 2);
}

#[tokio::test]
async fn test_cache_is_per_book() {
    let cache = MemoryCache::new();
    let normalizer = RecordingNormalizer::new();

    get_description(&cache, &normalizer, &vid("one"), "first").await.unwrap();
    let other = get_description(&cache, &normalizer, &vid("two"), "second")
        .await
        .unwrap();

    assert_eq!(other, "second");
    assert_eq!(cache.len().await, 2);
}

#[tokio::test]
async fn test_normalizer_failure_caches_nothing_and_is_internal() {
    let cache = MemoryCache::new();
    let normalizer = RecordingNormalizer::new();
    normalizer.set_failing(true);
    let id = vid("abc");

    let err = get_description(&cache, &normalizer, &id, "raw text")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Normalizer(_)));
    assert!(cache.is_empty().await);

    let app = AppError::from(err);
    assert_eq!(app.status().as_u16(), 500);
    assert_eq!(app.code(), "INTERNAL_SERVER_ERROR");

    // A later success is normalized and cached as usual
    normalizer.set_failing(false);
    let text = get_description(&cache, &normalizer, &id, "raw  text")
        .await
        .unwrap();
    assert_eq!(text, "raw text");
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_cache_failure_skips_normalizer() {
    let cache = MemoryCache::new();
    let normalizer = RecordingNormalizer::new();
    cache.set_failing(true);

    let err = get_description(&cache, &normalizer, &vid("abc"), "raw text")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Cache(_)));
    assert!(normalizer.calls().await.is_empty());
    assert_eq!(AppError::from(err).status().as_u16(), 500);
}
