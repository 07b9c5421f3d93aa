//! Book domain types.

use serde::Serialize;

use violet_pages_core::VolumeId;

/// A book, keyed by its Google Books volume id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: VolumeId,
    pub title: String,
    pub subtitle: Option<String>,
    /// Kept as the catalog's string (`"2004"`, `"2004-06"`, `"2004-06-01"`).
    pub published_date: Option<String>,
    pub page_count: Option<i32>,
}

/// A book with its authors in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookWithAuthors {
    #[serde(flatten)]
    pub book: Book,
    pub authors: Vec<String>,
}
