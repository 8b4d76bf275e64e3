//! Author pages

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::{respond, submission, FormPairs};
use crate::{error::AppResult, AppState};

/// List all authors
pub async fn author_list(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.authors.list().await?;
    respond(&state, page)
}

/// Author detail page
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.authors.detail(&id).await?;
    respond(&state, page)
}

/// Empty creation form
pub async fn author_create_get(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.authors.create_form();
    respond(&state, page)
}

/// Create a author from the submitted form
pub async fn author_create_post(
    State(state): State<AppState>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.authors.create(&submission(form)).await?;
    respond(&state, page)
}

/// Delete confirmation page
pub async fn author_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.authors.delete_form(&id).await?;
    respond(&state, page)
}

/// Delete the author identified in the form body
pub async fn author_delete_post(
    State(state): State<AppState>,
    Path(_id): Path<String>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.authors.delete(&submission(form)).await?;
    respond(&state, page)
}

/// Prefilled update form
pub async fn author_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.authors.update_form(&id).await?;
    respond(&state, page)
}

/// Overwrite the author at `id` with the submitted form
pub async fn author_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.authors.update(&id, &submission(form)).await?;
    respond(&state, page)
}
