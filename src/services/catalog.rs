//! Catalog home page

use serde_json::json;

use crate::{
    aggregate,
    error::AppResult,
    models::{CopyFilter, CopyStatus},
    repository::{RecordStore, Repository},
    views::{Page, View},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Record counts for the home page.
    ///
    /// A failed count still renders the page, with `error` set and no counts.
    pub async fn index(&self) -> AppResult<Page> {
        let available = CopyFilter::Status(CopyStatus::Available);
        let counts = aggregate::parallel(vec![
            ("book_count", self.repository.books.count(None)),
            ("book_instance_count", self.repository.copies.count(None)),
            (
                "book_instance_available_count",
                self.repository.copies.count(Some(&available)),
            ),
            ("author_count", self.repository.authors.count(None)),
            ("genre_count", self.repository.genres.count(None)),
        ])
        .await;

        let context = match counts {
            Ok(data) => json!({
                "title": "Local Library Home",
                "error": null,
                "data": data,
            }),
            Err(e) => {
                tracing::error!("Failed to count catalog records: {}", e);
                json!({
                    "title": "Local Library Home",
                    "error": e.to_string(),
                    "data": null,
                })
            }
        };

        Ok(Page::Render(View::new("index", context)))
    }
}
