//! Repository pattern implementation for data access layer
//!
//! This module is the record store: it owns every SQL statement the catalog
//! runs against the `authors` and `books` tables.

use crate::core::error::Result;
use crate::db::manager::DatabaseManager;
use crate::db::models::{Author, Book, BookWithAuthor, NewAuthor, NewBook};
use async_trait::async_trait;
use rusqlite::{OptionalExtension, Row};
use std::sync::Arc;

/// Common read/insert operations shared by all entity repositories
#[async_trait]
pub trait Repository<T>: Send + Sync {
    /// Validated input needed to insert a new row
    type New: Send + 'static;

    /// Find an entity by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<T>>;

    /// Find all entities
    async fn find_all(&self) -> Result<Vec<T>>;

    /// Insert a new entity and return it with its assigned ID
    async fn create(&self, new: Self::New) -> Result<T>;
}

const AUTHOR_COLUMNS: &str = "id, name, birth_date, date_of_death";

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        name: row.get(1)?,
        birth_date: row.get(2)?,
        date_of_death: row.get(3)?,
    })
}

/// Repository for Author entities
pub struct AuthorRepository {
    db: Arc<DatabaseManager>,
}

impl AuthorRepository {
    /// Create a new AuthorRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Check whether an author with the given ID exists
    pub async fn exists(&self, id: i64) -> Result<bool> {
        self.db
            .execute(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM authors WHERE id = ?",
                    [id],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await
    }
}

#[async_trait]
impl Repository<Author> for AuthorRepository {
    type New = NewAuthor;

    async fn find_by_id(&self, id: i64) -> Result<Option<Author>> {
        self.db
            .execute(move |conn| {
                let sql = format!("SELECT {} FROM authors WHERE id = ?", AUTHOR_COLUMNS);
                Ok(conn.query_row(&sql, [id], author_from_row).optional()?)
            })
            .await
    }

    /// All authors, ordered by name for form drop-downs
    async fn find_all(&self) -> Result<Vec<Author>> {
        self.db
            .execute(|conn| {
                let sql = format!("SELECT {} FROM authors ORDER BY name, id", AUTHOR_COLUMNS);
                let mut stmt = conn.prepare(&sql)?;
                let authors = stmt
                    .query_map([], author_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(authors)
            })
            .await
    }

    async fn create(&self, new: NewAuthor) -> Result<Author> {
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO authors (name, birth_date, date_of_death) VALUES (?, ?, ?)",
                    rusqlite::params![&new.name, &new.birth_date, &new.date_of_death],
                )?;
                Ok(Author {
                    id: conn.last_insert_rowid(),
                    name: new.name,
                    birth_date: new.birth_date,
                    date_of_death: new.date_of_death,
                })
            })
            .await
    }
}

const BOOK_WITH_AUTHOR_SELECT: &str = "SELECT b.id, b.isbn, b.title, b.publication_year, b.author_id, \
     a.id, a.name, a.birth_date, a.date_of_death \
     FROM books b JOIN authors a ON a.id = b.author_id";

fn book_with_author_from_row(row: &Row<'_>) -> rusqlite::Result<BookWithAuthor> {
    Ok(BookWithAuthor {
        book: Book {
            id: row.get(0)?,
            isbn: row.get(1)?,
            title: row.get(2)?,
            publication_year: row.get(3)?,
            author_id: row.get(4)?,
        },
        author: Author {
            id: row.get(5)?,
            name: row.get(6)?,
            birth_date: row.get(7)?,
            date_of_death: row.get(8)?,
        },
    })
}

/// Repository for Book entities
///
/// Reads always return the book joined with its author; the foreign key
/// guarantees the join never drops a row.
pub struct BookRepository {
    db: Arc<DatabaseManager>,
}

impl BookRepository {
    /// Create a new BookRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Delete a book, returning whether a row was removed
    pub async fn delete(&self, id: i64) -> Result<bool> {
        self.db
            .execute(move |conn| {
                let removed = conn.execute("DELETE FROM books WHERE id = ?", [id])?;
                Ok(removed > 0)
            })
            .await
    }
}

#[async_trait]
impl Repository<BookWithAuthor> for BookRepository {
    type New = NewBook;

    async fn find_by_id(&self, id: i64) -> Result<Option<BookWithAuthor>> {
        self.db
            .execute(move |conn| {
                let sql = format!("{} WHERE b.id = ?", BOOK_WITH_AUTHOR_SELECT);
                Ok(conn
                    .query_row(&sql, [id], book_with_author_from_row)
                    .optional()?)
            })
            .await
    }

    /// All books in insertion order
    async fn find_all(&self) -> Result<Vec<BookWithAuthor>> {
        self.db
            .execute(|conn| {
                let sql = format!("{} ORDER BY b.id", BOOK_WITH_AUTHOR_SELECT);
                let mut stmt = conn.prepare(&sql)?;
                let books = stmt
                    .query_map([], book_with_author_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(books)
            })
            .await
    }

    async fn create(&self, new: NewBook) -> Result<BookWithAuthor> {
        self.db
            .transaction(move |tx| {
                tx.execute(
                    "INSERT INTO books (isbn, title, publication_year, author_id) VALUES (?, ?, ?, ?)",
                    rusqlite::params![&new.isbn, &new.title, &new.publication_year, new.author_id],
                )?;
                let id = tx.last_insert_rowid();
                let sql = format!("{} WHERE b.id = ?", BOOK_WITH_AUTHOR_SELECT);
                Ok(tx.query_row(&sql, [id], book_with_author_from_row)?)
            })
            .await
    }
}
