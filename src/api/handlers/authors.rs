use super::{redirect_target, AppState};
use crate::api::models::CreateAuthorRequest;
use crate::core::error::{CatalogError, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form, Json,
};

/// Handler for GET /api/authors
pub async fn list_authors(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let authors = state.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// Handler for POST /api/authors
pub async fn create_author(
    State(state): State<AppState>,
    Json(req): Json<CreateAuthorRequest>,
) -> Result<impl IntoResponse> {
    let author = state.catalog.add_author(req).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Handler for POST /add_author - HTML form submission
pub async fn submit_author_form(
    State(state): State<AppState>,
    Form(req): Form<CreateAuthorRequest>,
) -> Result<Redirect> {
    match state.catalog.add_author(req).await {
        Ok(_) => Ok(Redirect::to(&redirect_target("/add_author", "author_added"))),
        Err(CatalogError::ValidationError(reason)) => {
            tracing::warn!(%reason, "Author form rejected");
            Ok(Redirect::to(&redirect_target("/add_author", "invalid_author")))
        }
        Err(e) => Err(e),
    }
}
