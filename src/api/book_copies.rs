//! Book copy pages

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::{respond, submission, FormPairs};
use crate::{error::AppResult, AppState};

/// List all book copies
pub async fn bookcopy_list(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.book_copies.list().await?;
    respond(&state, page)
}

/// Book copy detail page
pub async fn bookcopy_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.book_copies.detail(&id).await?;
    respond(&state, page)
}

/// Empty creation form
pub async fn bookcopy_create_get(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.book_copies.create_form().await?;
    respond(&state, page)
}

/// Create a book copy from the submitted form
pub async fn bookcopy_create_post(
    State(state): State<AppState>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.book_copies.create(&submission(form)).await?;
    respond(&state, page)
}

/// Delete confirmation page
pub async fn bookcopy_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.book_copies.delete_form(&id).await?;
    respond(&state, page)
}

/// Delete the book copy identified in the form body
pub async fn bookcopy_delete_post(
    State(state): State<AppState>,
    Path(_id): Path<String>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.book_copies.delete(&submission(form)).await?;
    respond(&state, page)
}

/// Prefilled update form
pub async fn bookcopy_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.book_copies.update_form(&id).await?;
    respond(&state, page)
}

/// Overwrite the book copy at `id` with the submitted form
pub async fn bookcopy_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.book_copies.update(&id, &submission(form)).await?;
    respond(&state, page)
}
