//! Book listing pipeline
//!
//! Turns the full book collection into display-ready entries:
//! filter by search text, sort, then attach a cover image to every survivor.
//! Filtering and sorting are pure; enrichment performs one sequential
//! lookup per book and never fails the listing. All lookups of one listing
//! share a time budget; books reached after it runs out get no cover.

use crate::cover::CoverLookup;
use crate::db::models::{Author, BookWithAuthor};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};

/// Cover lookup budget used when none is configured
pub const DEFAULT_LISTING_BUDGET: Duration = Duration::from_secs(20);

/// Recognised sort directives for the book list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Title,
    Author,
}

impl SortBy {
    /// Lenient parse: anything other than `title` or `author` means "no sort"
    pub fn parse(value: Option<&str>) -> Option<SortBy> {
        match value? {
            "title" => Some(SortBy::Title),
            "author" => Some(SortBy::Author),
            _ => None,
        }
    }
}

/// One row of the book list as presented to readers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEntry {
    pub id: i64,
    pub title: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub author: Author,
    /// Thumbnail URL, empty when no cover could be found
    pub cover_image: String,
}

/// Keep books whose title or author name contains `search`, ignoring case.
///
/// `None` and the empty string both keep every book.
pub fn filter_books(books: Vec<BookWithAuthor>, search: Option<&str>) -> Vec<BookWithAuthor> {
    let needle = match search {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => return books,
    };

    books
        .into_iter()
        .filter(|entry| {
            entry.book.title.to_lowercase().contains(&needle)
                || entry.author.name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable, case-sensitive sort; `None` leaves store order untouched
pub fn sort_books(books: &mut [BookWithAuthor], sort_by: Option<SortBy>) {
    match sort_by {
        Some(SortBy::Title) => books.sort_by(|a, b| a.book.title.cmp(&b.book.title)),
        Some(SortBy::Author) => books.sort_by(|a, b| a.author.name.cmp(&b.author.name)),
        None => {}
    }
}

/// Resolve the cover image for one book; always yields a string
async fn cover_image_for(
    lookup: &dyn CoverLookup,
    entry: &BookWithAuthor,
    deadline: Instant,
) -> String {
    let isbn = match entry.book.isbn.as_deref().map(str::trim) {
        Some(isbn) if !isbn.is_empty() => isbn,
        _ => {
            debug!(book_id = entry.book.id, "Book has no ISBN, skipping cover lookup");
            return String::new();
        }
    };

    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        debug!(book_id = entry.book.id, "Listing cover budget spent, skipping cover lookup");
        return String::new();
    }

    match timeout(remaining, lookup.lookup_by_isbn(isbn)).await {
        Ok(Ok(outcome)) => outcome.into_cover_image(),
        Ok(Err(e)) => {
            warn!(book_id = entry.book.id, isbn, error = %e, "Cover lookup failed");
            String::new()
        }
        Err(_) => {
            warn!(book_id = entry.book.id, isbn, "Cover lookup cut off by listing budget");
            String::new()
        }
    }
}

/// Attach cover images, one lookup at a time, preserving order.
///
/// Lookups stop once `budget` has elapsed; the remaining books keep an
/// empty cover.
pub async fn enrich_books(
    books: Vec<BookWithAuthor>,
    lookup: &dyn CoverLookup,
    budget: Duration,
) -> Vec<ViewEntry> {
    let deadline = Instant::now() + budget;
    let mut entries = Vec::with_capacity(books.len());

    for entry in books {
        let cover_image = cover_image_for(lookup, &entry, deadline).await;
        entries.push(ViewEntry {
            id: entry.book.id,
            title: entry.book.title,
            isbn: entry.book.isbn,
            publication_year: entry.book.publication_year,
            author: entry.author,
            cover_image,
        });
    }

    entries
}

/// Run the whole pipeline over an already fetched collection
pub async fn build_listing(
    books: Vec<BookWithAuthor>,
    search: Option<&str>,
    sort_by: Option<SortBy>,
    lookup: &dyn CoverLookup,
    budget: Duration,
) -> Vec<ViewEntry> {
    let total = books.len();
    let mut books = filter_books(books, search);
    sort_books(&mut books, sort_by);
    debug!(total, matched = books.len(), ?sort_by, "Filtered book listing");

    enrich_books(books, lookup, budget).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{CatalogError, Result};
    use crate::cover::CoverLookupOutcome;
    use crate::db::models::Book;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BUDGET: Duration = Duration::from_secs(5);

    /// Scripted lookup that records every ISBN it is asked about
    #[derive(Default)]
    struct ScriptedLookup {
        responses: HashMap<String, Option<CoverLookupOutcome>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedLookup {
        fn with(mut self, isbn: &str, outcome: Option<CoverLookupOutcome>) -> Self {
            self.responses.insert(isbn.to_string(), outcome);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CoverLookup for ScriptedLookup {
        async fn lookup_by_isbn(&self, isbn: &str) -> Result<CoverLookupOutcome> {
            self.calls.lock().unwrap().push(isbn.to_string());
            match self.responses.get(isbn) {
                Some(Some(outcome)) => Ok(outcome.clone()),
                Some(None) => Err(CatalogError::Timeout(format!("lookup for {}", isbn))),
                None => Ok(CoverLookupOutcome::NotFound),
            }
        }
    }

    fn book(id: i64, title: &str, author: &str, isbn: Option<&str>) -> BookWithAuthor {
        BookWithAuthor {
            book: Book {
                id,
                isbn: isbn.map(str::to_string),
                title: title.to_string(),
                publication_year: Some(1900 + id as i32),
                author_id: id * 10,
            },
            author: Author {
                id: id * 10,
                name: author.to_string(),
                birth_date: None,
                date_of_death: None,
            },
        }
    }

    fn dune_and_emma() -> Vec<BookWithAuthor> {
        vec![
            book(1, "Dune", "Herbert", Some("111")),
            book(2, "Emma", "Austen", Some("222")),
        ]
    }

    fn titles(books: &[BookWithAuthor]) -> Vec<&str> {
        books.iter().map(|b| b.book.title.as_str()).collect()
    }

    #[test]
    fn test_sort_by_parse_is_lenient() {
        assert_eq!(SortBy::parse(Some("title")), Some(SortBy::Title));
        assert_eq!(SortBy::parse(Some("author")), Some(SortBy::Author));
        assert_eq!(SortBy::parse(Some("Title")), None);
        assert_eq!(SortBy::parse(Some("year")), None);
        assert_eq!(SortBy::parse(None), None);
    }

    #[test]
    fn test_search_matches_title_case_insensitively() {
        let result = filter_books(dune_and_emma(), Some("du"));
        assert_eq!(titles(&result), vec!["Dune"]);

        let result = filter_books(dune_and_emma(), Some("EMM"));
        assert_eq!(titles(&result), vec!["Emma"]);
    }

    #[test]
    fn test_search_matches_author_name() {
        let result = filter_books(dune_and_emma(), Some("aust"));
        assert_eq!(titles(&result), vec!["Emma"]);
    }

    #[test]
    fn test_empty_or_absent_search_keeps_everything() {
        assert_eq!(filter_books(dune_and_emma(), Some("")), dune_and_emma());
        assert_eq!(filter_books(dune_and_emma(), None), dune_and_emma());
    }

    #[test]
    fn test_sort_by_title_and_author() {
        let mut books = vec![
            book(2, "Emma", "Austen", None),
            book(1, "Dune", "Herbert", None),
        ];
        sort_books(&mut books, Some(SortBy::Title));
        assert_eq!(titles(&books), vec!["Dune", "Emma"]);

        sort_books(&mut books, Some(SortBy::Author));
        assert_eq!(titles(&books), vec!["Emma", "Dune"]);
    }

    #[test]
    fn test_title_sort_is_case_sensitive() {
        let mut books = vec![
            book(1, "apple", "A", None),
            book(2, "Banana", "B", None),
        ];
        sort_books(&mut books, Some(SortBy::Title));
        assert_eq!(titles(&books), vec!["Banana", "apple"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut books = vec![
            book(1, "Emma", "Austen", None),
            book(2, "Persuasion", "Austen", None),
            book(3, "Dune", "Herbert", None),
            book(4, "Mansfield Park", "Austen", None),
        ];
        sort_books(&mut books, Some(SortBy::Author));
        assert_eq!(
            titles(&books),
            vec!["Emma", "Persuasion", "Mansfield Park", "Dune"]
        );
    }

    #[tokio::test]
    async fn test_listing_search_then_sort() {
        let lookup = ScriptedLookup::default();
        let books = vec![
            book(1, "The Dispossessed", "Le Guin", None),
            book(2, "Dune", "Herbert", None),
            book(3, "Emma", "Austen", None),
            book(4, "Kindred", "Butler", None),
        ];

        let entries = build_listing(books, Some("IN"), Some(SortBy::Title), &lookup, BUDGET).await;
        let listed: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(listed, vec!["Kindred", "The Dispossessed"]);
    }

    #[tokio::test]
    async fn test_enrichment_uses_thumbnail() {
        let lookup = ScriptedLookup::default().with(
            "111",
            Some(CoverLookupOutcome::Found {
                thumbnail_url: Some("http://covers/dune.jpg".to_string()),
            }),
        );

        let entries = build_listing(dune_and_emma(), None, None, &lookup, BUDGET).await;
        assert_eq!(entries[0].cover_image, "http://covers/dune.jpg");
        assert_eq!(entries[1].cover_image, "");
        assert_eq!(lookup.calls(), vec!["111", "222"]);
    }

    #[tokio::test]
    async fn test_not_found_gives_empty_cover() {
        let lookup = ScriptedLookup::default().with("123", Some(CoverLookupOutcome::NotFound));
        let entries =
            build_listing(vec![book(1, "Dune", "Herbert", Some("123"))], None, None, &lookup, BUDGET).await;
        assert_eq!(entries[0].cover_image, "");
    }

    #[tokio::test]
    async fn test_found_without_thumbnail_gives_empty_cover() {
        let lookup = ScriptedLookup::default()
            .with("456", Some(CoverLookupOutcome::Found { thumbnail_url: None }));
        let entries =
            build_listing(vec![book(1, "Dune", "Herbert", Some("456"))], None, None, &lookup, BUDGET).await;
        assert_eq!(entries[0].cover_image, "");
    }

    #[tokio::test]
    async fn test_lookup_failure_keeps_book() {
        let lookup = ScriptedLookup::default().with("789", None);
        let source = book(1, "Dune", "Herbert", Some("789"));

        let entries = build_listing(vec![source.clone()], None, None, &lookup, BUDGET).await;
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.cover_image, "");
        assert_eq!(entry.title, "Dune");
        assert_eq!(entry.isbn.as_deref(), Some("789"));
        assert_eq!(entry.publication_year, source.book.publication_year);
        assert_eq!(entry.author, source.author);
    }

    #[tokio::test]
    async fn test_books_without_isbn_are_not_looked_up() {
        let lookup = ScriptedLookup::default();
        let books = vec![
            book(1, "Dune", "Herbert", None),
            book(2, "Emma", "Austen", Some("  ")),
            book(3, "Kindred", "Butler", Some("333")),
        ];

        let entries = build_listing(books, None, None, &lookup, BUDGET).await;
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.cover_image.is_empty()));
        assert_eq!(lookup.calls(), vec!["333"]);
    }

    #[tokio::test]
    async fn test_only_surviving_books_are_looked_up() {
        let lookup = ScriptedLookup::default();
        build_listing(dune_and_emma(), Some("dune"), None, &lookup, BUDGET).await;
        assert_eq!(lookup.calls(), vec!["111"]);
    }

    /// Found after a fixed delay, recording every ISBN it is asked about
    struct SlowLookup {
        delay: Duration,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CoverLookup for SlowLookup {
        async fn lookup_by_isbn(&self, isbn: &str) -> Result<CoverLookupOutcome> {
            self.calls.lock().unwrap().push(isbn.to_string());
            tokio::time::sleep(self.delay).await;
            Ok(CoverLookupOutcome::Found {
                thumbnail_url: Some(format!("http://covers/{}.jpg", isbn)),
            })
        }
    }

    #[tokio::test]
    async fn test_budget_caps_total_lookup_time() {
        let lookup = SlowLookup {
            delay: Duration::from_millis(200),
            calls: Mutex::new(Vec::new()),
        };
        let books = vec![
            book(1, "Dune", "Herbert", Some("111")),
            book(2, "Emma", "Austen", Some("222")),
            book(3, "Kindred", "Butler", Some("333")),
        ];

        let started = std::time::Instant::now();
        let entries = build_listing(books, None, None, &lookup, Duration::from_millis(300)).await;

        assert!(started.elapsed() < Duration::from_millis(600));
        assert_eq!(titles_of(&entries), vec!["Dune", "Emma", "Kindred"]);
        assert_eq!(entries[0].cover_image, "http://covers/111.jpg");
        assert_eq!(entries[1].cover_image, "");
        assert_eq!(entries[2].cover_image, "");
        assert_eq!(*lookup.calls.lock().unwrap(), vec!["111", "222"]);
    }

    fn titles_of(entries: &[ViewEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    fn arb_books() -> impl Strategy<Value = Vec<BookWithAuthor>> {
        prop::collection::vec(("[a-zA-Z ]{0,8}", "[a-zA-Z ]{0,8}"), 0..12).prop_map(|pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (title, author))| book(i as i64, &title, &author, None))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_filter_keeps_exactly_matching_books(books in arb_books(), search in "[a-zA-Z]{1,3}") {
            let needle = search.to_lowercase();
            let expected: Vec<BookWithAuthor> = books
                .iter()
                .filter(|b| {
                    b.book.title.to_lowercase().contains(&needle)
                        || b.author.name.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect();

            prop_assert_eq!(filter_books(books, Some(search.as_str())), expected);
        }

        #[test]
        fn prop_filter_without_search_is_identity(books in arb_books()) {
            prop_assert_eq!(filter_books(books.clone(), None), books);
        }

        #[test]
        fn prop_title_sort_orders_and_permutes(books in arb_books()) {
            let mut sorted = books.clone();
            sort_books(&mut sorted, Some(SortBy::Title));

            prop_assert!(sorted.windows(2).all(|w| w[0].book.title <= w[1].book.title));

            let mut ids: Vec<i64> = sorted.iter().map(|b| b.book.id).collect();
            ids.sort_unstable();
            let mut original: Vec<i64> = books.iter().map(|b| b.book.id).collect();
            original.sort_unstable();
            prop_assert_eq!(ids, original);
        }

        #[test]
        fn prop_author_sort_orders(books in arb_books()) {
            let mut sorted = books;
            sort_books(&mut sorted, Some(SortBy::Author));
            prop_assert!(sorted.windows(2).all(|w| w[0].author.name <= w[1].author.name));
        }

        #[test]
        fn prop_no_sort_keeps_order(books in arb_books()) {
            let mut unsorted = books.clone();
            sort_books(&mut unsorted, SortBy::parse(Some("publication_year")));
            prop_assert_eq!(unsorted, books);
        }
    }
}
