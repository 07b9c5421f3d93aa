//! Recent search history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use violet_pages_core::{SearchId, UserId};

use super::RepositoryError;
use crate::models::Search;
use crate::ports::SearchHistoryStore;
use crate::services::search_history::{RecordPlan, plan_record};

const SEARCH_COLUMNS: &str = "id, user_id, query, searched_at";

// Wall-clock time, so a record that waited on the user row lock sorts after
// the record it waited for.
fn touch_sql() -> String {
    format!(
        r"
        UPDATE searches
        SET searched_at = clock_timestamp()
        WHERE id = $1
        RETURNING {SEARCH_COLUMNS}
        "
    )
}

fn insert_sql() -> String {
    format!(
        r"
        INSERT INTO searches (user_id, query, searched_at)
        VALUES ($1, $2, clock_timestamp())
        RETURNING {SEARCH_COLUMNS}
        "
    )
}

#[derive(Debug, sqlx::FromRow)]
struct SearchRow {
    id: SearchId,
    user_id: UserId,
    query: String,
    searched_at: DateTime<Utc>,
}

impl From<SearchRow> for Search {
    fn from(r: SearchRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            query: r.query,
            searched_at: r.searched_at,
        }
    }
}

/// `PostgreSQL` implementation of [`SearchHistoryStore`].
pub struct SearchRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SearchRepository<'a> {
    /// Create a new search repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchHistoryStore for SearchRepository<'_> {
    async fn history(&self, user: UserId) -> Result<Vec<Search>, RepositoryError> {
        let rows = sqlx::query_as::<_, SearchRow>(&format!(
            r"
            SELECT {SEARCH_COLUMNS}
            FROM searches
            WHERE user_id = $1
            ORDER BY searched_at DESC, id DESC
            "
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Search::from).collect())
    }

    #[instrument(skip(self, query))]
    async fn record(&self, user: UserId, query: &str) -> Result<Search, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent records for the same user
        let locked: Option<UserId> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(user)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let existing: Vec<Search> = sqlx::query_as::<_, SearchRow>(&format!(
            "SELECT {SEARCH_COLUMNS} FROM searches WHERE user_id = $1"
        ))
        .bind(user)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Search::from)
        .collect();

        let row = match plan_record(&existing, query) {
            RecordPlan::Touch(id) => {
                sqlx::query_as::<_, SearchRow>(&touch_sql())
                .bind(id)
                .fetch_one(&mut *tx)
                .await?
            }
            RecordPlan::Insert { evict } => {
                if !evict.is_empty() {
                    sqlx::query("DELETE FROM searches WHERE id = ANY($1)")
                        .bind(evict.iter().map(|id| id.as_i32()).collect::<Vec<_>>())
                        .execute(&mut *tx)
                        .await?;
                    tracing::debug!(evicted = evict.len(), "Evicted old searches");
                }

                sqlx::query_as::<_, SearchRow>(&insert_sql())
                .bind(user)
                .bind(query)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(row.into())
    }
}
