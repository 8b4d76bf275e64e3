//! Catalog home page

use axum::{extract::State, response::Response};

use super::respond;
use crate::{error::AppResult, AppState};

/// Record counts for the whole catalog
pub async fn index(State(state): State<AppState>) -> AppResult<Response> {
    let page = state.services.catalog.index().await?;
    respond(&state, page)
}
