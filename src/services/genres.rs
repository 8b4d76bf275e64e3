//! Genre pages: list, detail, create, delete and update

use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, Genre, GenreFilter, GenreForm, Record, RecordId},
    repository::{RecordStore, Repository},
    validation::{check, FieldError, Submission},
    views::{present, present_all, Page, View},
};

const LIST_URL: &str = "/catalog/genres";

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
}

impl GenresService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All genres, ascending by name
    pub async fn list(&self) -> AppResult<Page> {
        let mut genres = self.repository.genres.find_all().await?;
        genres.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Page::Render(View::new(
            "genre_list",
            json!({
                "title": "Genre List",
                "genre_list": present_all(&genres)?,
            }),
        )))
    }

    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = RecordId::from(id);
        let (genre, books) = self.with_books(&id).await?;
        let genre = genre.ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))?;

        Ok(Page::Render(View::new(
            "genre_detail",
            json!({
                "title": "Genre Detail",
                "genre": present(&genre)?,
                "genre_books": present_all(&books)?,
            }),
        )))
    }

    pub fn create_form(&self) -> Page {
        Page::Render(form_view("Create Genre", None, &[]))
    }

    /// Create a genre, or resolve to the one already holding the submitted name
    pub async fn create(&self, submission: &Submission) -> AppResult<Page> {
        let checked = check::<GenreForm>(submission);
        if !checked.is_valid() {
            return Ok(Page::Render(form_view(
                "Create Genre",
                Some(&checked.form),
                &checked.errors,
            )));
        }

        if let Some(existing) = self.find_by_name(&checked.form.name).await? {
            tracing::info!("Genre {:?} already exists as id={}", existing.name, existing.id);
            return Ok(Page::redirect(existing.url()));
        }

        let genre = checked.form.to_genre(RecordId::generate());
        match self.repository.genres.save(&genre).await {
            Ok(()) => {
                tracing::info!("Created genre id={} name={:?}", genre.id, genre.name);
                Ok(Page::redirect(genre.url()))
            }
            // A concurrent submission stored the same name first
            Err(AppError::Conflict(_)) => {
                let existing = self.find_by_name(&genre.name).await?.ok_or_else(|| {
                    AppError::Internal(format!("Genre {:?} conflicted but is missing", genre.name))
                })?;
                tracing::info!("Genre {:?} created concurrently as id={}", existing.name, existing.id);
                Ok(Page::redirect(existing.url()))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete_form(&self, id: &str) -> AppResult<Page> {
        let id = RecordId::from(id);
        let (genre, books) = self.with_books(&id).await?;
        match genre {
            Some(genre) => Ok(Page::Render(delete_view(&genre, &books)?)),
            None => Ok(Page::redirect(LIST_URL)),
        }
    }

    /// Delete the genre named by `genreid` in the body unless books are filed under it
    pub async fn delete(&self, submission: &Submission) -> AppResult<Page> {
        let id = submission.identity("genreid")?;
        let (genre, books) = self.with_books(&id).await?;
        let Some(genre) = genre else {
            return Ok(Page::redirect(LIST_URL));
        };

        if !books.is_empty() {
            tracing::info!("Not deleting genre id={}: {} books use it", id, books.len());
            return Ok(Page::Render(delete_view(&genre, &books)?));
        }

        self.repository.genres.delete(&id).await?;
        tracing::info!("Deleted genre id={}", id);
        Ok(Page::redirect(LIST_URL))
    }

    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = RecordId::from(id);
        let genre = self
            .repository
            .genres
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))?;

        Ok(Page::Render(View::new(
            "genre_form",
            json!({
                "title": "Update Genre",
                "genre": present(&genre)?,
                "errors": [],
            }),
        )))
    }

    /// Rename the genre stored under `id`. Taking another genre's name is
    /// reported on the form rather than merging the two.
    pub async fn update(&self, id: &str, submission: &Submission) -> AppResult<Page> {
        let checked = check::<GenreForm>(submission);
        if !checked.is_valid() {
            return Ok(Page::Render(form_view(
                "Update Genre",
                Some(&checked.form),
                &checked.errors,
            )));
        }

        let genre = checked.form.to_genre(RecordId::from(id));
        match self.repository.genres.update(&genre).await {
            Ok(()) => {
                tracing::info!("Updated genre id={}", genre.id);
                Ok(Page::redirect(genre.url()))
            }
            Err(AppError::Conflict(_)) => Ok(Page::Render(form_view(
                "Update Genre",
                Some(&checked.form),
                &[FieldError::new("name", "Genre name already in use")],
            ))),
            Err(e) => Err(e),
        }
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let by_name = GenreFilter::Name(name.to_string());
        Ok(self.repository.genres.find_by(&by_name).await?.into_iter().next())
    }

    async fn with_books(&self, id: &RecordId) -> AppResult<(Option<Genre>, Vec<Book>)> {
        let in_genre = BookFilter::Genre(id.clone());
        tokio::try_join!(
            self.repository.genres.find_by_id(id),
            self.repository.books.find_by(&in_genre),
        )
    }
}

fn form_view(title: &str, submitted: Option<&GenreForm>, errors: &[FieldError]) -> View {
    View::new(
        "genre_form",
        json!({
            "title": title,
            "genre": submitted,
            "errors": errors,
        }),
    )
}

fn delete_view(genre: &Genre, books: &[Book]) -> AppResult<View> {
    Ok(View::new(
        "genre_delete",
        json!({
            "title": "Delete Genre",
            "genre": present(genre)?,
            "genre_books": present_all(books)?,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    /// Genre store that loses the name race: the first name lookup misses,
    /// the save conflicts, and later lookups see the winner
    struct LostRace {
        winner: Genre,
        looked_up: AtomicBool,
    }

    #[async_trait]
    impl RecordStore<Genre> for LostRace {
        async fn find_all(&self) -> AppResult<Vec<Genre>> {
            Ok(vec![self.winner.clone()])
        }

        async fn find_by_id(&self, id: &RecordId) -> AppResult<Option<Genre>> {
            Ok(Some(self.winner.clone()).filter(|g| g.id == *id))
        }

        async fn find_by(&self, _filter: &GenreFilter) -> AppResult<Vec<Genre>> {
            if self.looked_up.swap(true, Ordering::SeqCst) {
                Ok(vec![self.winner.clone()])
            } else {
                Ok(Vec::new())
            }
        }

        async fn count(&self, _filter: Option<&GenreFilter>) -> AppResult<u64> {
            Ok(1)
        }

        async fn save(&self, record: &Genre) -> AppResult<()> {
            Err(AppError::Conflict(format!("genre '{}' already exists", record.name)))
        }

        async fn update(&self, record: &Genre) -> AppResult<()> {
            Err(AppError::Conflict(format!("genre '{}' already exists", record.name)))
        }

        async fn delete(&self, _id: &RecordId) -> AppResult<()> {
            Ok(())
        }
    }

    fn genre(id: &str, name: &str) -> Genre {
        Genre {
            id: RecordId::from(id),
            name: name.to_string(),
        }
    }

    fn book_in(id: &str, genre: &str) -> Book {
        Book {
            id: RecordId::from(id),
            title: format!("Book {}", id),
            author: RecordId::from("A1"),
            summary: "s".to_string(),
            isbn: "i".to_string(),
            genres: vec![RecordId::from(genre)],
        }
    }

    fn service() -> (Repository, GenresService) {
        let repository = Repository::in_memory();
        (repository.clone(), GenresService::new(repository))
    }

    fn redirect(page: Page) -> String {
        match page {
            Page::Redirect(to) => to,
            Page::Render(view) => panic!("expected a redirect, got view {}", view.template),
        }
    }

    fn view(page: Page) -> View {
        match page {
            Page::Render(view) => view,
            Page::Redirect(to) => panic!("expected a view, got redirect to {}", to),
        }
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let (repository, service) = service();
        repository.genres.save(&genre("G1", "Zeta")).await.unwrap();
        repository.genres.save(&genre("G2", "Alpha")).await.unwrap();

        let view = view(service.list().await.unwrap());
        let names: Vec<&str> = view.context["genre_list"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|g| g["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[tokio::test]
    async fn test_create_is_deduplicated_by_name() {
        let (repository, service) = service();
        let submission = Submission::from_pairs([("name", "Sci-Fi")]);

        let first = redirect(service.create(&submission).await.unwrap());
        let second = redirect(service.create(&submission).await.unwrap());

        assert_eq!(first, second);
        let all = repository.genres.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Sci-Fi");
    }

    #[tokio::test]
    async fn test_create_empty_name() {
        let (repository, service) = service();

        let view = view(service.create(&Submission::from_pairs([("name", "   ")])).await.unwrap());

        assert_eq!(view.context["errors"][0]["message"], "Genre name required");
        assert_eq!(view.context["genre"]["name"], "");
        assert_eq!(repository.genres.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_books() {
        let (repository, service) = service();
        repository.genres.save(&genre("G1", "Fantasy")).await.unwrap();
        repository.books.save(&book_in("B1", "G1")).await.unwrap();

        let view = view(service.delete(&Submission::from_pairs([("genreid", "G1")])).await.unwrap());

        assert_eq!(view.template, "genre_delete");
        assert_eq!(view.context["genre_books"][0]["title"], "Book B1");
        assert!(repository.genres.find_by_id(&RecordId::from("G1")).await.unwrap().is_some());
        assert_eq!(repository.books.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_unreferenced_then_not_found() {
        let (repository, service) = service();
        repository.genres.save(&genre("G1", "Fantasy")).await.unwrap();
        repository.books.save(&book_in("B1", "G2")).await.unwrap();

        let to = redirect(service.delete(&Submission::from_pairs([("genreid", "G1")])).await.unwrap());

        assert_eq!(to, LIST_URL);
        assert!(matches!(service.detail("G1").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_body_identity() {
        let (_, service) = service();
        let err = service.delete(&Submission::default()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_rename_to_taken_name() {
        let (repository, service) = service();
        repository.genres.save(&genre("G1", "Fantasy")).await.unwrap();
        repository.genres.save(&genre("G2", "Horror")).await.unwrap();

        let view = view(service.update("G2", &Submission::from_pairs([("name", "Fantasy")])).await.unwrap());

        assert_eq!(view.context["errors"][0]["field"], "name");
        let stored = repository.genres.find_by_id(&RecordId::from("G2")).await.unwrap().unwrap();
        assert_eq!(stored.name, "Horror");
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let (repository, service) = service();
        repository.genres.save(&genre("G1", "Fantasy")).await.unwrap();

        let to = redirect(service.update("G1", &Submission::from_pairs([("name", "High Fantasy")])).await.unwrap());

        assert_eq!(to, "/catalog/genre/G1");
        assert_eq!(repository.genres.find_all().await.unwrap(), vec![genre("G1", "High Fantasy")]);
    }

    #[tokio::test]
    async fn test_update_form_unknown_genre() {
        let (_, service) = service();
        assert!(matches!(service.update_form("nope").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_resolves_concurrent_duplicate() {
        let mut repository = Repository::in_memory();
        repository.genres = Arc::new(LostRace {
            winner: genre("G9", "Sci-Fi"),
            looked_up: AtomicBool::new(false),
        });
        let service = GenresService::new(repository);

        let to = redirect(service.create(&Submission::from_pairs([("name", "Sci-Fi")])).await.unwrap());

        assert_eq!(to, "/catalog/genre/G9");
    }

    #[tokio::test]
    async fn test_update_with_empty_name_persists_nothing() {
        let (repository, service) = service();
        repository.genres.save(&genre("G1", "Fantasy")).await.unwrap();

        let view = view(service.update("G1", &Submission::from_pairs([("name", "")])).await.unwrap());

        assert_eq!(view.template, "genre_form");
        assert_eq!(view.context["errors"][0]["message"], "Genre name required");
        let stored = repository.genres.find_by_id(&RecordId::from("G1")).await.unwrap().unwrap();
        assert_eq!(stored.name, "Fantasy");
    }

    #[tokio::test]
    async fn test_update_unknown_genre_is_not_found() {
        let (repository, service) = service();

        let err = service.update("nope", &Submission::from_pairs([("name", "Horror")])).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(repository.genres.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_absent_genre_with_dangling_books_redirects() {
        let (repository, service) = service();
        repository.books.save(&book_in("B1", "gone")).await.unwrap();

        let to = redirect(service.delete(&Submission::from_pairs([("genreid", "gone")])).await.unwrap());

        assert_eq!(to, LIST_URL);
        assert_eq!(repository.books.count(None).await.unwrap(), 1);
    }
}
