use super::common::deserialize_optional_number;
use crate::db::models::BookWithAuthor;
use serde::{Deserialize, Serialize};

/// Query parameters for the book list
///
/// Both are free-form strings; unrecognised values are ignored rather
/// than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    pub search_query: Option<String>,
    pub sort_by: Option<String>,
}

/// Request body for adding a book (JSON or form-encoded)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub publication_year: Option<i32>,
    pub author_id: i64,
}

/// Response for a confirmed delete
#[derive(Debug, Serialize)]
pub struct DeleteBookResponse {
    pub message: String,
    pub book: BookWithAuthor,
}
