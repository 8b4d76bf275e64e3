//! Genre pages

use axum::{
    extract::{Path, State},
    response::Response,
};

use super::{respond, submission, FormPairs};
use crate::{error::AppResult, AppState};

/// List all genres
pub async fn genre_list(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.genres.list().await?;
    respond(&state, page)
}

/// Genre detail page
pub async fn genre_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.genres.detail(&id).await?;
    respond(&state, page)
}

/// Empty creation form
pub async fn genre_create_get(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.genres.create_form();
    respond(&state, page)
}

/// Create a genre from the submitted form
pub async fn genre_create_post(
    State(state): State<AppState>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.genres.create(&submission(form)).await?;
    respond(&state, page)
}

/// Delete confirmation page
pub async fn genre_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.genres.delete_form(&id).await?;
    respond(&state, page)
}

/// Delete the genre identified in the form body
pub async fn genre_delete_post(
    State(state): State<AppState>,
    Path(_id): Path<String>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.genres.delete(&submission(form)).await?;
    respond(&state, page)
}

/// Prefilled update form
pub async fn genre_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.genres.update_form(&id).await?;
    respond(&state, page)
}

/// Overwrite the genre at `id` with the submitted form
pub async fn genre_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormPairs,
) -> AppResult<Response> {
    let page = state.services.genres.update(&id, &submission(form)).await?;
    respond(&state, page)
}
