//! Lists, books and membership edges.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use violet_pages_core::{ListId, UserId, VolumeId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{Book, BookWithAuthors, List, ListChanges, NewList};
use crate::ports::LibraryStore;

const LIST_COLUMNS: &str = "id, author_id, name, description, is_public, created_at, updated_at";
const DUPLICATE_LIST_NAME: &str = "list name already taken";

#[derive(Debug, sqlx::FromRow)]
struct ListRow {
    id: ListId,
    author_id: UserId,
    name: String,
    description: String,
    is_public: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ListRow> for List {
    fn from(r: ListRow) -> Self {
        Self {
            id: r.id,
            author_id: r.author_id,
            name: r.name,
            description: r.description,
            is_public: r.is_public,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: VolumeId,
    title: String,
    subtitle: Option<String>,
    published_date: Option<String>,
    page_count: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
struct BookAuthorRow {
    book_id: String,
    author_name: String,
}

/// `PostgreSQL` implementation of [`LibraryStore`].
pub struct LibraryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LibraryRepository<'a> {
    /// Create a new library repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LibraryStore for LibraryRepository<'_> {
    async fn lists_owned_by(&self, owner: UserId) -> Result<Vec<List>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListRow>(&format!(
            r"
            SELECT {LIST_COLUMNS}
            FROM lists
            WHERE author_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(List::from).collect())
    }

    async fn find_list(&self, id: ListId) -> Result<Option<List>, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(&format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(List::from))
    }

    async fn book_exists(&self, id: &VolumeId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(exists)
    }

    async fn lists_containing(
        &self,
        book: &VolumeId,
        owner: UserId,
    ) -> Result<BTreeSet<ListId>, RepositoryError> {
        let ids: Vec<ListId> = sqlx::query_scalar(
            r"
            SELECT lb.list_id
            FROM list_books lb
            JOIN lists l ON l.id = lb.list_id
            WHERE lb.book_id = $1 AND l.author_id = $2
            ",
        )
        .bind(book)
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    #[instrument(skip(self, book), fields(volume_id = %book.book.id))]
    async fn insert_book_if_absent(&self, book: &BookWithAuthors) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r"
            INSERT INTO books (id, title, subtitle, published_date, page_count)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(&book.book.id)
        .bind(&book.book.title)
        .bind(&book.book.subtitle)
        .bind(&book.book.published_date)
        .bind(book.book.page_count)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // Someone else stored it first; their author rows stand
        if inserted == 0 {
            tx.commit().await?;
            return Ok(());
        }

        for (position, author) in book.authors.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| RepositoryError::DataCorruption("too many authors".to_string()))?;

            sqlx::query("INSERT INTO authors (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
                .bind(author)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r"
                INSERT INTO book_authors (book_id, author_name, position)
                VALUES ($1, $2, $3)
                ON CONFLICT (book_id, author_name) DO NOTHING
                ",
            )
            .bind(&book.book.id)
            .bind(author)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn add_edge(&self, list: ListId, book: &VolumeId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO list_books (list_id, book_id)
            VALUES ($1, $2)
            ON CONFLICT (list_id, book_id) DO NOTHING
            ",
        )
        .bind(list)
        .bind(book)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn remove_edge(&self, list: ListId, book: &VolumeId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM list_books WHERE list_id = $1 AND book_id = $2")
            .bind(list)
            .bind(book)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    async fn books_in_list(&self, list: ListId) -> Result<Vec<BookWithAuthors>, RepositoryError> {
        let books = sqlx::query_as::<_, BookRow>(
            r"
            SELECT b.id, b.title, b.subtitle, b.published_date, b.page_count
            FROM list_books lb
            JOIN books b ON b.id = lb.book_id
            WHERE lb.list_id = $1
            ORDER BY lb.added_at DESC, b.id
            ",
        )
        .bind(list)
        .fetch_all(self.pool)
        .await?;

        if books.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = books.iter().map(|b| b.id.to_string()).collect();
        let author_rows = sqlx::query_as::<_, BookAuthorRow>(
            r"
            SELECT book_id, author_name
            FROM book_authors
            WHERE book_id = ANY($1)
            ORDER BY book_id, position
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut authors: HashMap<String, Vec<String>> = HashMap::new();
        for row in author_rows {
            authors.entry(row.book_id).or_default().push(row.author_name);
        }

        Ok(books
            .into_iter()
            .map(|b| {
                let names = authors.remove(b.id.as_str()).unwrap_or_default();
                BookWithAuthors {
                    book: Book {
                        id: b.id,
                        title: b.title,
                        subtitle: b.subtitle,
                        published_date: b.published_date,
                        page_count: b.page_count,
                    },
                    authors: names,
                }
            })
            .collect())
    }

    #[instrument(skip(self, list), fields(name = %list.name))]
    async fn create_list(&self, owner: UserId, list: &NewList) -> Result<List, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(&format!(
            r"
            INSERT INTO lists (author_id, name, description, is_public)
            VALUES ($1, $2, $3, $4)
            RETURNING {LIST_COLUMNS}
            "
        ))
        .bind(owner)
        .bind(list.name.as_str())
        .bind(&list.description)
        .bind(list.is_public)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_LIST_NAME))?;

        Ok(row.into())
    }

    #[instrument(skip(self, changes))]
    async fn update_list(
        &self,
        id: ListId,
        changes: &ListChanges,
    ) -> Result<List, RepositoryError> {
        let row = sqlx::query_as::<_, ListRow>(&format!(
            r"
            UPDATE lists
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_public = COALESCE($4, is_public),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {LIST_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.name.as_ref().map(|n| n.as_str()))
        .bind(&changes.description)
        .bind(changes.is_public)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_LIST_NAME))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn delete_list(&self, id: ListId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
