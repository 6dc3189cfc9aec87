//! Database models
//!
//! Data structures representing database tables

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Author record in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Book record in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub isbn: Option<String>,
    pub title: String,
    pub publication_year: Option<i32>,
    pub author_id: i64,
}

/// A book joined with the author it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookWithAuthor {
    #[serde(flatten)]
    pub book: Book,
    pub author: Author,
}

/// Validated values for a new author row
#[derive(Debug, Clone)]
pub struct NewAuthor {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Validated values for a new book row
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub author_id: i64,
}
