//! HTTP handlers and routing for the catalog pages

pub mod authors;
pub mod book_copies;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;

use axum::{
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{error::AppResult, validation::Submission, views::Page, AppState};

/// Urlencoded body as ordered pairs, so repeated keys survive decoding
pub type FormPairs = axum::Form<Vec<(String, String)>>;

pub(crate) fn submission(axum::Form(pairs): FormPairs) -> Submission {
    Submission::from_pairs(pairs)
}

/// Render or redirect
pub(crate) fn respond(state: &AppState, page: Page) -> AppResult<Response> {
    match page {
        Page::Render(view) => {
            let html = state.renderer.render(&view)?;
            Ok(Html(html).into_response())
        }
        Page::Redirect(to) => Ok(Redirect::to(&to).into_response()),
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let catalog = Router::new()
        .route("/", get(catalog::index))
        // Books
        .route("/books", get(books::book_list))
        .route(
            "/book/create",
            get(books::book_create_get).post(books::book_create_post),
        )
        .route("/book/:id", get(books::book_detail))
        .route(
            "/book/:id/delete",
            get(books::book_delete_get).post(books::book_delete_post),
        )
        .route(
            "/book/:id/update",
            get(books::book_update_get).post(books::book_update_post),
        )
        // Genres
        .route("/genres", get(genres::genre_list))
        .route(
            "/genre/create",
            get(genres::genre_create_get).post(genres::genre_create_post),
        )
        .route("/genre/:id", get(genres::genre_detail))
        .route(
            "/genre/:id/delete",
            get(genres::genre_delete_get).post(genres::genre_delete_post),
        )
        .route(
            "/genre/:id/update",
            get(genres::genre_update_get).post(genres::genre_update_post),
        )
        // Authors
        .route("/authors", get(authors::author_list))
        .route(
            "/author/create",
            get(authors::author_create_get).post(authors::author_create_post),
        )
        .route("/author/:id", get(authors::author_detail))
        .route(
            "/author/:id/delete",
            get(authors::author_delete_get).post(authors::author_delete_post),
        )
        .route(
            "/author/:id/update",
            get(authors::author_update_get).post(authors::author_update_post),
        )
        // Book copies
        .route("/bookcopies", get(book_copies::bookcopy_list))
        .route(
            "/bookcopy/create",
            get(book_copies::bookcopy_create_get).post(book_copies::bookcopy_create_post),
        )
        .route("/bookcopy/:id", get(book_copies::bookcopy_detail))
        .route(
            "/bookcopy/:id/delete",
            get(book_copies::bookcopy_delete_get).post(book_copies::bookcopy_delete_post),
        )
        .route(
            "/bookcopy/:id/update",
            get(book_copies::bookcopy_update_get).post(book_copies::bookcopy_update_post),
        );

    Router::new()
        .route("/", get(|| async { Redirect::to("/catalog") }))
        .route("/health", get(health::health_check))
        .nest("/catalog", catalog)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
