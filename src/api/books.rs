//! Book pages

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::{respond, submission, FormPairs};
use crate::{error::AppResult, AppState};

/// List all books
pub async fn book_list(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.books.list().await?;
    respond(&state, page)
}

/// Book detail page
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.books.detail(&id).await?;
    respond(&state, page)
}

/// Empty creation form
pub async fn book_create_get(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.books.create_form().await?;
    respond(&state, page)
}

/// Create a book from the submitted form
pub async fn book_create_post(
    State(state): State<AppState>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.books.create(&submission(form)).await?;
    respond(&state, page)
}

/// Delete confirmation page
pub async fn book_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.books.delete_form(&id).await?;
    respond(&state, page)
}

/// Delete the book identified in the form body
pub async fn book_delete_post(
    State(state): State<AppState>,
    Path(_id): Path<String>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.books.delete(&submission(form)).await?;
    respond(&state, page)
}

/// Prefilled update form
pub async fn book_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.books.update_form(&id).await?;
    respond(&state, page)
}

/// Overwrite the book at `id` with the submitted form
pub async fn book_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.books.update(&id, &submission(form)).await?;
    respond(&state, page)
}
