use super::{redirect_target, AppState};
use crate::api::models::{CreateBookRequest, DeleteBookResponse, ListBooksQuery};
use crate::core::error::{CatalogError, Result};
use crate::core::listing::SortBy;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form, Json,
};

/// Handler for GET /api/books - Listing with covers
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<ListBooksQuery>,
) -> Result<impl IntoResponse> {
    let sort_by = SortBy::parse(params.sort_by.as_deref());
    let entries = state
        .catalog
        .list_books(params.search_query.as_deref(), sort_by)
        .await?;

    Ok(Json(entries))
}

/// Handler for GET /api/books/:id and GET /book/:id/delete
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let book = state.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Handler for POST /api/books
pub async fn create_book(
    State(state): State<AppState>,
    Json(req): Json<CreateBookRequest>,
) -> Result<impl IntoResponse> {
    let book = state.catalog.add_book(req).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Handler for DELETE /api/books/:id
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let book = state.catalog.delete_book(id).await?;

    Ok(Json(DeleteBookResponse {
        message: format!("Book '{}' deleted", book.book.title),
        book,
    }))
}

/// Handler for POST /add_book - HTML form submission
///
/// Validation failures go back to the form; anything else is a real error.
pub async fn submit_book_form(
    State(state): State<AppState>,
    Form(req): Form<CreateBookRequest>,
) -> Result<Redirect> {
    match state.catalog.add_book(req).await {
        Ok(_) => Ok(Redirect::to(&redirect_target("/add_book", "book_added"))),
        Err(CatalogError::ValidationError(reason)) => {
            tracing::warn!(%reason, "Book form rejected");
            Ok(Redirect::to(&redirect_target("/add_book", "invalid_book")))
        }
        Err(e) => Err(e),
    }
}

/// Handler for POST /book/:id/delete - confirmed delete from the HTML page
pub async fn confirm_delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect> {
    state.catalog.delete_book(id).await?;
    Ok(Redirect::to(&redirect_target("/", "book_deleted")))
}
