//! API routes

use crate::api::handlers::{
    confirm_delete_book, create_author, create_book, delete_book, get_book, list_authors,
    list_books, submit_author_form, submit_book_form, AppState,
};
use axum::{
    routing::{get, get_service},
    Router,
};
use std::path::Path;
use tower_http::services::ServeFile;

/// Build the catalog routes
///
/// `pages_dir` holds the HTML forms served on GET for the form endpoints.
pub fn build_api_routes(state: AppState, pages_dir: &Path) -> Router {
    // JSON endpoints
    let api_routes = Router::new()
        .route("/api/books", get(list_books).post(create_book))
        .route("/api/books/:id", get(get_book).delete(delete_book))
        .route("/api/authors", get(list_authors).post(create_author));

    // HTML form endpoints
    let form_routes = Router::new()
        .route(
            "/add_author",
            get_service(ServeFile::new(pages_dir.join("add_author.html"))).post(submit_author_form),
        )
        .route(
            "/add_book",
            get_service(ServeFile::new(pages_dir.join("add_book.html"))).post(submit_book_form),
        )
        .route("/book/:id/delete", get(get_book).post(confirm_delete_book));

    api_routes.merge(form_routes).with_state(state)
}
