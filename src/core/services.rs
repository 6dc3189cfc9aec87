//! Business logic services
//!
//! The catalog service sits between the HTTP handlers and the record store:
//! it validates input, runs the listing pipeline and owns the delete flow.

use crate::api::models::{CreateAuthorRequest, CreateBookRequest};
use crate::core::error::{CatalogError, Result};
use crate::core::listing::{self, SortBy, ViewEntry};
use crate::cover::CoverLookup;
use crate::db::models::{Author, BookWithAuthor, NewAuthor, NewBook};
use crate::db::repository::{AuthorRepository, BookRepository, Repository};
use chrono::{Datelike, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Accepted date format for birth and death dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Catalog service for authors and books
pub struct CatalogService {
    author_repo: Arc<AuthorRepository>,
    book_repo: Arc<BookRepository>,
    cover_lookup: Arc<dyn CoverLookup>,
    listing_budget: Duration,
}

impl CatalogService {
    /// Create a new CatalogService
    pub fn new(
        author_repo: Arc<AuthorRepository>,
        book_repo: Arc<BookRepository>,
        cover_lookup: Arc<dyn CoverLookup>,
    ) -> Self {
        Self {
            author_repo,
            book_repo,
            cover_lookup,
            listing_budget: listing::DEFAULT_LISTING_BUDGET,
        }
    }

    /// Cap the time one listing spends on cover lookups
    pub fn with_listing_budget(mut self, budget: Duration) -> Self {
        self.listing_budget = budget;
        self
    }

    /// List books for display, optionally searched and sorted
    pub async fn list_books(
        &self,
        search_query: Option<&str>,
        sort_by: Option<SortBy>,
    ) -> Result<Vec<ViewEntry>> {
        let books = self.book_repo.find_all().await?;
        Ok(listing::build_listing(
            books,
            search_query,
            sort_by,
            self.cover_lookup.as_ref(),
            self.listing_budget,
        )
        .await)
    }

    /// All authors ordered by name
    pub async fn list_authors(&self) -> Result<Vec<Author>> {
        self.author_repo.find_all().await
    }

    /// Get a single book with its author
    pub async fn get_book(&self, id: i64) -> Result<BookWithAuthor> {
        self.book_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Validate and insert a new author
    pub async fn add_author(&self, request: CreateAuthorRequest) -> Result<Author> {
        let new_author = validate_author(request, Utc::now().date_naive())?;
        let author = self.author_repo.create(new_author).await?;
        info!(author_id = author.id, name = %author.name, "Author added");
        Ok(author)
    }

    /// Validate and insert a new book for an existing author
    pub async fn add_book(&self, request: CreateBookRequest) -> Result<BookWithAuthor> {
        let new_book = validate_book(request, Utc::now().year())?;

        if !self.author_repo.exists(new_book.author_id).await? {
            return Err(CatalogError::ValidationError(format!(
                "Author with id {} does not exist",
                new_book.author_id
            )));
        }

        let book = self.book_repo.create(new_book).await?;
        info!(book_id = book.book.id, title = %book.book.title, "Book added");
        Ok(book)
    }

    /// Delete a book, returning the removed row
    pub async fn delete_book(&self, id: i64) -> Result<BookWithAuthor> {
        let book = self.get_book(id).await?;

        if !self.book_repo.delete(id).await? {
            // Removed concurrently between the lookup and the delete
            return Err(CatalogError::NotFound(format!("Book with id {} not found", id)));
        }

        info!(book_id = id, title = %book.book.title, "Book deleted");
        Ok(book)
    }
}

/// Trimmed value, `None` when absent or blank
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(field: &str, value: Option<String>, today: NaiveDate) -> Result<Option<NaiveDate>> {
    let Some(raw) = non_blank(value) else {
        return Ok(None);
    };

    let date = NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|_| {
        CatalogError::ValidationError(format!("{} must be a date in YYYY-MM-DD format", field))
    })?;

    if date > today {
        return Err(CatalogError::ValidationError(format!(
            "{} cannot be in the future",
            field
        )));
    }

    Ok(Some(date))
}

/// Apply the author input rules against `today`
pub fn validate_author(request: CreateAuthorRequest, today: NaiveDate) -> Result<NewAuthor> {
    let name = non_blank(Some(request.name))
        .ok_or_else(|| CatalogError::ValidationError("name cannot be empty".to_string()))?;

    let birth_date = parse_date("birth_date", request.birth_date, today)?;
    let date_of_death = parse_date("date_of_death", request.date_of_death, today)?;

    if let (Some(born), Some(died)) = (birth_date, date_of_death) {
        if died < born {
            return Err(CatalogError::ValidationError(
                "date_of_death cannot be earlier than birth_date".to_string(),
            ));
        }
    }

    Ok(NewAuthor {
        name,
        birth_date,
        date_of_death,
    })
}

/// Apply the book input rules against the current year
pub fn validate_book(request: CreateBookRequest, current_year: i32) -> Result<NewBook> {
    let title = non_blank(Some(request.title))
        .ok_or_else(|| CatalogError::ValidationError("title cannot be empty".to_string()))?;

    if let Some(year) = request.publication_year {
        let latest = current_year + 1;
        if !(0..=latest).contains(&year) {
            return Err(CatalogError::ValidationError(format!(
                "publication_year must be between 0 and {}",
                latest
            )));
        }
    }

    Ok(NewBook {
        title,
        isbn: non_blank(request.isbn),
        publication_year: request.publication_year,
        author_id: request.author_id,
    })
}
