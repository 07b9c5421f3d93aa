//! Search history types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use violet_pages_core::{SearchId, UserId};

/// A recent search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Search {
    pub id: SearchId,
    pub user_id: UserId,
    pub query: String,
    pub searched_at: DateTime<Utc>,
}
