//! Google Books API response types.
//!
//! Field names follow the API's camelCase JSON, which is also what the RPC
//! layer forwards to clients.

use serde::{Deserialize, Serialize};

use violet_pages_core::VolumeId;

use super::CatalogError;
use crate::models::{Book, BookWithAuthors};

/// A single catalog volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

/// Bibliographic data of a volume. Every field is optional upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    /// Raw description, often with HTML or markdown noise.
    pub description: Option<String>,
    pub page_count: Option<i32>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub average_rating: Option<f64>,
    pub image_links: Option<ImageLinks>,
    pub language: Option<String>,
}

/// Cover image URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSearch {
    #[serde(default)]
    pub total_items: i64,
    #[serde(default)]
    pub items: Vec<Volume>,
}

impl Volume {
    /// Snapshot the fields stored in `books` and `book_authors`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Malformed` if the volume id is not a valid
    /// [`VolumeId`] or the volume has no title.
    pub fn to_book(&self) -> Result<BookWithAuthors, CatalogError> {
        let id = VolumeId::parse(&self.id)
            .map_err(|e| CatalogError::Malformed(format!("volume id {:?}: {e}", self.id)))?;

        let info = &self.volume_info;
        let title = info
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CatalogError::Malformed(format!("volume {id} has no title")))?
            .to_string();

        // Keep first occurrence order, drop blanks and repeats
        let mut authors: Vec<String> = Vec::with_capacity(info.authors.len());
        for name in info.authors.iter().map(|a| a.trim()) {
            if !name.is_empty() && !authors.iter().any(|a| a == name) {
                authors.push(name.to_string());
            }
        }

        Ok(BookWithAuthors {
            book: Book {
                id,
                title,
                subtitle: info.subtitle.clone(),
                published_date: info.published_date.clone(),
                page_count: info.page_count,
            },
            authors,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const VOLUME_JSON: &str = r#"{
        "kind": "books#volume",
        "id": "zyTCAlFPjgYC",
        "volumeInfo": {
            "title": "The Google Story",
            "authors": ["David A. Vise", "Mark Malseed", "David A. Vise"],
            "publishedDate": "2005-11-15",
            "description": "**Here is the story** behind one of the most remarkable...",
            "pageCount": 207,
            "imageLinks": {
                "smallThumbnail": "http://books.google.com/small",
                "thumbnail": "http://books.google.com/thumb"
            }
        }
    }"#;

    #[test]
    fn test_volume_deserialization() {
        let volume: Volume = serde_json::from_str(VOLUME_JSON).unwrap();
        assert_eq!(volume.id, "zyTCAlFPjgYC");
        assert_eq!(volume.volume_info.page_count, Some(207));
        assert_eq!(
            volume.volume_info.image_links.unwrap().thumbnail.as_deref(),
            Some("http://books.google.com/thumb")
        );
    }

    #[test]
    fn test_to_book_keeps_author_order_and_drops_repeats() {
        let volume: Volume = serde_json::from_str(VOLUME_JSON).unwrap();
        let book = volume.to_book().unwrap();
        assert_eq!(book.book.id.as_str(), "zyTCAlFPjgYC");
        assert_eq!(book.book.title, "The Google Story");
        assert_eq!(book.book.published_date.as_deref(), Some("2005-11-15"));
        assert_eq!(book.authors, vec!["David A. Vise", "Mark Malseed"]);
    }

    #[test]
    fn test_to_book_requires_title() {
        let volume: Volume =
            serde_json::from_str(r#"{"id": "abc", "volumeInfo": {"title": "  "}}"#).unwrap();
        assert!(matches!(volume.to_book(), Err(CatalogError::Malformed(_))));
    }

    #[test]
    fn test_to_book_rejects_bad_id() {
        let volume: Volume =
            serde_json::from_str(r#"{"id": "a/b", "volumeInfo": {"title": "T"}}"#).unwrap();
        assert!(matches!(volume.to_book(), Err(CatalogError::Malformed(_))));
    }

    #[test]
    fn test_search_without_items() {
        let search: VolumeSearch =
            serde_json::from_str(r#"{"kind": "books#volumes", "totalItems": 0}"#).unwrap();
        assert_eq!(search.total_items, 0);
        assert!(search.items.is_empty());
    }
}
