//! Search history ring: the five most recent distinct queries per user.

use chrono::{DateTime, Utc};
use tracing::instrument;

use violet_pages_core::{SearchId, UserId};

use super::ServiceError;
use crate::models::Search;
use crate::ports::SearchHistoryStore;

/// Maximum searches kept per user.
pub const MAX_SEARCHES: usize = 5;

/// What recording a query does to the user's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordPlan {
    /// The query is already stored; bump its timestamp.
    Touch(SearchId),
    /// Insert a new row after deleting `evict` (oldest first).
    Insert { evict: Vec<SearchId> },
}

/// Decide how to record `query` given the user's current rows.
///
/// Never evicts the row being touched. When the user is at capacity the
/// oldest rows (by `searched_at`, then id) make room for the new one.
#[must_use]
pub fn plan_record(existing: &[Search], query: &str) -> RecordPlan {
    if let Some(found) = existing.iter().find(|s| s.query == query) {
        return RecordPlan::Touch(found.id);
    }

    let overflow = (existing.len() + 1).saturating_sub(MAX_SEARCHES);
    let mut by_age: Vec<(DateTime<Utc>, SearchId)> =
        existing.iter().map(|s| (s.searched_at, s.id)).collect();
    by_age.sort_unstable();

    RecordPlan::Insert {
        evict: by_age.into_iter().take(overflow).map(|(_, id)| id).collect(),
    }
}

/// Record a search for `user`.
///
/// # Errors
///
/// Returns `ServiceError::BadRequest` if the trimmed query is empty.
#[instrument(skip(store, query))]
pub async fn record_search(
    store: &dyn SearchHistoryStore,
    user: UserId,
    query: &str,
) -> Result<Search, ServiceError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ServiceError::BadRequest(
            "Search query cannot be empty".to_string(),
        ));
    }

    Ok(store.record(user, query).await?)
}

/// The user's recent searches, most recent first.
///
/// # Errors
///
/// Returns `ServiceError::Repository` if the store fails.
pub async fn get_history(
    store: &dyn SearchHistoryStore,
    user: UserId,
) -> Result<Vec<Search>, ServiceError> {
    Ok(store.history(user).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn search(id: i32, query: &str, minutes: i64) -> Search {
        Search {
            id: SearchId::new(id),
            user_id: UserId::new(1),
            query: query.to_string(),
            searched_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_existing_query_is_touched() {
        let rows = vec![search(1, "dune", 0), search(2, "emma", 1)];
        assert_eq!(plan_record(&rows, "dune"), RecordPlan::Touch(SearchId::new(1)));
    }

    #[test]
    fn test_insert_below_capacity_evicts_nothing() {
        let rows = vec![search(1, "a", 0), search(2, "b", 1)];
        assert_eq!(
            plan_record(&rows, "c"),
            RecordPlan::Insert { evict: vec![] }
        );
    }

    #[test]
    fn test_sixth_query_evicts_oldest() {
        let rows = vec![
            search(1, "a", 4),
            search(2, "b", 0),
            search(3, "c", 3),
            search(4, "d", 2),
            search(5, "e", 1),
        ];
        assert_eq!(
            plan_record(&rows, "f"),
            RecordPlan::Insert {
                evict: vec![SearchId::new(2)]
            }
        );
    }

    #[test]
    fn test_touch_at_capacity_never_evicts() {
        let rows: Vec<Search> = (1..=5).map(|i| search(i, &format!("q{i}"), i64::from(i))).collect();
        assert_eq!(plan_record(&rows, "q1"), RecordPlan::Touch(SearchId::new(1)));
    }

    #[test]
    fn test_over_capacity_restores_limit() {
        let rows: Vec<Search> = (1..=7).map(|i| search(i, &format!("q{i}"), i64::from(i))).collect();
        assert_eq!(
            plan_record(&rows, "new"),
            RecordPlan::Insert {
                evict: vec![SearchId::new(1), SearchId::new(2), SearchId::new(3)]
            }
        );
    }

    #[test]
    fn test_same_timestamp_evicts_lowest_id() {
        let rows: Vec<Search> = (1..=5).map(|i| search(i, &format!("q{i}"), 0)).collect();
        assert_eq!(
            plan_record(&rows, "new"),
            RecordPlan::Insert {
                evict: vec![SearchId::new(1)]
            }
        );
    }
}
