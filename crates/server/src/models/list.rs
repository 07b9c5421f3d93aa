//! Reading list domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use violet_pages_core::{ListId, ListName, UserId};

use super::BookWithAuthors;

/// A named, owned collection of books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: ListId,
    pub author_id: UserId,
    pub name: String,
    pub description: String,
    #[serde(rename = "public")]
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A list together with its current books.
#[derive(Debug, Clone, Serialize)]
pub struct ListWithBooks {
    #[serde(flatten)]
    pub list: List,
    pub books: Vec<BookWithAuthors>,
}

/// A list as seen by a particular viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDetail {
    #[serde(flatten)]
    pub list: ListWithBooks,
    /// Whether the viewer owns the list.
    pub is_author: bool,
}

/// Whether one of the caller's lists contains a given book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembership {
    pub list_id: ListId,
    pub name: String,
    pub has_book: bool,
}

/// A validated list to create.
#[derive(Debug, Clone)]
pub struct NewList {
    pub name: ListName,
    pub description: String,
    pub is_public: bool,
}

/// Partial list update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ListChanges {
    pub name: Option<ListName>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}
