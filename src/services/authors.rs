//! Author pages: list, detail, create, delete and update

use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{Author, AuthorForm, Book, BookFilter, Record, RecordId},
    repository::{RecordStore, Repository},
    validation::{check, FieldError, Submission},
    views::{present, present_all, Page, View},
};

const LIST_URL: &str = "/catalog/authors";

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All authors, ascending by family name
    pub async fn list(&self) -> AppResult<Page> {
        let mut authors = self.repository.authors.find_all().await?;
        authors.sort_by(|a, b| a.family_name.cmp(&b.family_name));

        Ok(Page::Render(View::new(
            "author_list",
            json!({
                "title": "Author List",
                "author_list": present_all(&authors)?,
            }),
        )))
    }

    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = RecordId::from(id);
        let (author, books) = self.with_books(&id).await?;
        let author =
            author.ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;

        Ok(Page::Render(View::new(
            "author_detail",
            json!({
                "title": "Author Detail",
                "author": present(&author)?,
                "author_books": present_all(&books)?,
            }),
        )))
    }

    pub fn create_form(&self) -> Page {
        Page::Render(form_view("Create Author", None, &[]))
    }

    pub async fn create(&self, submission: &Submission) -> AppResult<Page> {
        let checked = check::<AuthorForm>(submission);
        if !checked.is_valid() {
            return Ok(Page::Render(form_view(
                "Create Author",
                Some(&checked.form),
                &checked.errors,
            )));
        }

        let author = checked.form.to_author(RecordId::generate());
        self.repository.authors.save(&author).await?;
        tracing::info!("Created author id={} name={:?}", author.id, author.full_name());
        Ok(Page::redirect(author.url()))
    }

    pub async fn delete_form(&self, id: &str) -> AppResult<Page> {
        let id = RecordId::from(id);
        let (author, books) = self.with_books(&id).await?;
        match author {
            Some(author) => Ok(Page::Render(delete_view(&author, &books)?)),
            None => Ok(Page::redirect(LIST_URL)),
        }
    }

    /// Delete the author named by `authorid` in the body unless books still credit them
    pub async fn delete(&self, submission: &Submission) -> AppResult<Page> {
        let id = submission.identity("authorid")?;
        let (author, books) = self.with_books(&id).await?;
        let Some(author) = author else {
            return Ok(Page::redirect(LIST_URL));
        };

        if !books.is_empty() {
            tracing::info!("Not deleting author id={}: {} books credit them", id, books.len());
            return Ok(Page::Render(delete_view(&author, &books)?));
        }

        self.repository.authors.delete(&id).await?;
        tracing::info!("Deleted author id={}", id);
        Ok(Page::redirect(LIST_URL))
    }

    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = RecordId::from(id);
        let author = self
            .repository
            .authors
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;

        Ok(Page::Render(View::new(
            "author_form",
            json!({
                "title": "Update Author",
                "author": present(&author)?,
                "errors": [],
            }),
        )))
    }

    pub async fn update(&self, id: &str, submission: &Submission) -> AppResult<Page> {
        let checked = check::<AuthorForm>(submission);
        if !checked.is_valid() {
            return Ok(Page::Render(form_view(
                "Update Author",
                Some(&checked.form),
                &checked.errors,
            )));
        }

        let author = checked.form.to_author(RecordId::from(id));
        self.repository.authors.update(&author).await?;
        tracing::info!("Updated author id={}", author.id);
        Ok(Page::redirect(author.url()))
    }

    async fn with_books(&self, id: &RecordId) -> AppResult<(Option<Author>, Vec<Book>)> {
        let by_author = BookFilter::Author(id.clone());
        tokio::try_join!(
            self.repository.authors.find_by_id(id),
            self.repository.books.find_by(&by_author),
        )
    }
}

fn form_view(title: &str, submitted: Option<&AuthorForm>, errors: &[FieldError]) -> View {
    View::new(
        "author_form",
        json!({
            "title": title,
            "author": submitted,
            "errors": errors,
        }),
    )
}

fn delete_view(author: &Author, books: &[Book]) -> AppResult<View> {
    Ok(View::new(
        "author_delete",
        json!({
            "title": "Delete Author",
            "author": present(author)?,
            "author_books": present_all(books)?,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn service() -> (Repository, AuthorsService) {
        let repository = Repository::in_memory();
        (repository.clone(), AuthorsService::new(repository))
    }

    fn view(page: Page) -> View {
        match page {
            Page::Render(view) => view,
            Page::Redirect(to) => panic!("expected a view, got redirect to {}", to),
        }
    }

    #[tokio::test]
    async fn test_create_parses_dates() {
        let (repository, service) = service();
        let submission = Submission::from_pairs([
            ("first_name", " Ursula "),
            ("family_name", "Le Guin"),
            ("date_of_birth", "1929-10-21"),
            ("date_of_death", "2018-01-22"),
        ]);

        let page = service.create(&submission).await.unwrap();
        assert!(matches!(page, Page::Redirect(_)));

        let all = repository.authors.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].first_name, "Ursula");
        assert_eq!(all[0].date_of_birth, NaiveDate::from_ymd_opt(1929, 10, 21));
        assert_eq!(all[0].lifespan(), "1929-10-21 - 2018-01-22");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_date_and_keeps_input() {
        let (repository, service) = service();
        let submission = Submission::from_pairs([
            ("first_name", "Ursula"),
            ("family_name", ""),
            ("date_of_birth", "21/10/1929"),
        ]);

        let view = view(service.create(&submission).await.unwrap());

        let fields: Vec<&str> = view.context["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["field"].as_str())
            .collect();
        assert_eq!(fields, vec!["family_name", "date_of_birth"]);
        assert_eq!(view.context["author"]["date_of_birth"], "21&#x2F;10&#x2F;1929");
        assert_eq!(repository.authors.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_sorted_by_family_name() {
        let (repository, service) = service();
        for (id, first, family) in [("A1", "Isaac", "Asimov"), ("A2", "Iain", "Banks"), ("A3", "Arthur", "Clarke")].into_iter().rev() {
            repository
                .authors
                .save(&Author {
                    id: RecordId::from(id),
                    first_name: first.to_string(),
                    family_name: family.to_string(),
                    date_of_birth: None,
                    date_of_death: None,
                })
                .await
                .unwrap();
        }

        let view = view(service.list().await.unwrap());
        let names: Vec<&str> = view.context["author_list"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|a| a["full_name"].as_str())
            .collect();
        assert_eq!(names, vec!["Asimov, Isaac", "Banks, Iain", "Clarke, Arthur"]);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_books() {
        let (repository, service) = service();
        repository
            .authors
            .save(&Author {
                id: RecordId::from("A1"),
                first_name: "Iain".to_string(),
                family_name: "Banks".to_string(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();
        repository
            .books
            .save(&Book {
                id: RecordId::from("B1"),
                title: "Excession".to_string(),
                author: RecordId::from("A1"),
                summary: "s".to_string(),
                isbn: "i".to_string(),
                genres: Vec::new(),
            })
            .await
            .unwrap();

        let view = view(service.delete(&Submission::from_pairs([("authorid", "A1")])).await.unwrap());

        assert_eq!(view.template, "author_delete");
        assert_eq!(repository.authors.count(None).await.unwrap(), 1);
    }

    fn redirect(page: Page) -> String {
        match page {
            Page::Redirect(to) => to,
            Page::Render(view) => panic!("expected a redirect, got view {}", view.template),
        }
    }

    async fn seeded() -> (Repository, AuthorsService) {
        let (repository, service) = service();
        repository
            .authors
            .save(&Author {
                id: RecordId::from("A1"),
                first_name: "Octavia".to_string(),
                family_name: "Butler".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1947, 6, 22),
                date_of_death: None,
            })
            .await
            .unwrap();
        (repository, service)
    }

    #[tokio::test]
    async fn test_update_form_prefills_author() {
        let (_, service) = seeded().await;

        let view = view(service.update_form("A1").await.unwrap());

        assert_eq!(view.template, "author_form");
        assert_eq!(view.context["author"]["first_name"], "Octavia");
        assert_eq!(view.context["author"]["date_of_birth"], "1947-06-22");
        assert_eq!(view.context["errors"], serde_json::json!([]));
        assert!(matches!(service.update_form("nope").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let (repository, service) = seeded().await;
        let submission = Submission::from_pairs([
            ("first_name", "Octavia E."),
            ("family_name", "Butler"),
            ("date_of_birth", "1947-06-22"),
            ("date_of_death", "2006-02-24"),
        ]);

        let to = redirect(service.update("A1", &submission).await.unwrap());

        assert_eq!(to, "/catalog/author/A1");
        let all = repository.authors.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].first_name, "Octavia E.");
        assert_eq!(all[0].date_of_death, NaiveDate::from_ymd_opt(2006, 2, 24));
    }

    #[tokio::test]
    async fn test_update_with_empty_name_persists_nothing() {
        let (repository, service) = seeded().await;
        let submission = Submission::from_pairs([("first_name", "Olivia"), ("family_name", " ")]);

        let view = view(service.update("A1", &submission).await.unwrap());

        assert_eq!(view.template, "author_form");
        assert_eq!(view.context["errors"][0]["field"], "family_name");
        assert_eq!(view.context["author"]["first_name"], "Olivia");
        let stored = repository.authors.find_by_id(&RecordId::from("A1")).await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Octavia");
        assert_eq!(stored.family_name, "Butler");
    }

    #[tokio::test]
    async fn test_update_unknown_author_is_not_found() {
        let (repository, service) = service();
        let submission = Submission::from_pairs([("first_name", "Iain"), ("family_name", "Banks")]);

        let err = service.update("nope", &submission).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(repository.authors.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_absent_author_redirects() {
        let (repository, service) = service();
        repository
            .books
            .save(&Book {
                id: RecordId::from("B1"),
                title: "Kindred".to_string(),
                author: RecordId::from("gone"),
                summary: "s".to_string(),
                isbn: "i".to_string(),
                genres: Vec::new(),
            })
            .await
            .unwrap();

        let to = redirect(service.delete(&Submission::from_pairs([("authorid", "gone")])).await.unwrap());

        assert_eq!(to, LIST_URL);
        assert_eq!(repository.books.count(None).await.unwrap(), 1);
    }
}
