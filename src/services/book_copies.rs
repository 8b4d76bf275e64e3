//! Book copy pages: list, detail, create, delete and update

use futures::future::try_join_all;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookCopy, BookCopyForm, CopyStatus, PopulatedCopy, Record, RecordId},
    repository::{RecordStore, Repository},
    validation::{check, FieldError, Submission},
    views::{choice, present, Page, View},
};

const LIST_URL: &str = "/catalog/bookcopies";

#[derive(Clone)]
pub struct BookCopiesService {
    repository: Repository,
}

impl BookCopiesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All copies in store order, each with its book
    pub async fn list(&self) -> AppResult<Page> {
        let copies = self.repository.copies.find_all().await?;
        let copies = try_join_all(copies.into_iter().map(|copy| self.populate(copy))).await?;

        Ok(Page::Render(View::new(
            "bookcopy_list",
            json!({
                "title": "Book Copy List",
                "bookcopy_list": copies.iter().map(PopulatedCopy::present).collect::<AppResult<Vec<_>>>()?,
            }),
        )))
    }

    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = RecordId::from(id);
        let copy = self
            .find_populated(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))?;
        let title = match &copy.book {
            Some(book) => format!("Copy: {}", book.title),
            None => "Copy".to_string(),
        };

        Ok(Page::Render(View::new(
            "bookcopy_detail",
            json!({
                "title": title,
                "bookcopy": copy.present()?,
            }),
        )))
    }

    pub async fn create_form(&self) -> AppResult<Page> {
        let books = self.choices().await?;
        Ok(Page::Render(form_view("Create Book Copy", &books, None, &[])?))
    }

    pub async fn create(&self, submission: &Submission) -> AppResult<Page> {
        let checked = check::<BookCopyForm>(submission);
        if !checked.is_valid() {
            let books = self.choices().await?;
            return Ok(Page::Render(form_view(
                "Create Book Copy",
                &books,
                Some(&checked.form),
                &checked.errors,
            )?));
        }

        let copy = checked.form.to_copy(RecordId::generate());
        self.repository.copies.save(&copy).await?;
        tracing::info!("Created book copy id={} book={}", copy.id, copy.book);
        Ok(Page::redirect(copy.url()))
    }

    pub async fn delete_form(&self, id: &str) -> AppResult<Page> {
        match self.find_populated(&RecordId::from(id)).await? {
            Some(copy) => Ok(Page::Render(View::new(
                "bookcopy_delete",
                json!({
                    "title": "Delete Book Copy",
                    "bookcopy": copy.present()?,
                }),
            ))),
            None => Ok(Page::redirect(LIST_URL)),
        }
    }

    /// Copies have no dependents, so the copy named by `bookcopyid` is always removed
    pub async fn delete(&self, submission: &Submission) -> AppResult<Page> {
        let id = submission.identity("bookcopyid")?;
        self.repository.copies.delete(&id).await?;
        tracing::info!("Deleted book copy id={}", id);
        Ok(Page::redirect(LIST_URL))
    }

    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = RecordId::from(id);
        let (copy, books) = tokio::try_join!(self.find_populated(&id), self.choices())?;
        let copy = copy.ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))?;

        let books: Vec<Value> = books
            .iter()
            .map(|b| choice(b, "selected", b.id == copy.copy.book))
            .collect::<AppResult<_>>()?;

        Ok(Page::Render(View::new(
            "bookcopy_form",
            json!({
                "title": "Update Book Copy",
                "book_list": books,
                "statuses": statuses(Some(copy.copy.status.as_str())),
                "bookcopy": present(&copy.copy)?,
                "errors": [],
            }),
        )))
    }

    pub async fn update(&self, id: &str, submission: &Submission) -> AppResult<Page> {
        let checked = check::<BookCopyForm>(submission);
        if !checked.is_valid() {
            let books = self.choices().await?;
            return Ok(Page::Render(form_view(
                "Update Book Copy",
                &books,
                Some(&checked.form),
                &checked.errors,
            )?));
        }

        let copy = checked.form.to_copy(RecordId::from(id));
        self.repository.copies.update(&copy).await?;
        tracing::info!("Updated book copy id={}", copy.id);
        Ok(Page::redirect(copy.url()))
    }

    async fn populate(&self, copy: BookCopy) -> AppResult<PopulatedCopy> {
        let book = self.repository.books.find_by_id(&copy.book).await?;
        Ok(PopulatedCopy { copy, book })
    }

    async fn find_populated(&self, id: &RecordId) -> AppResult<Option<PopulatedCopy>> {
        match self.repository.copies.find_by_id(id).await? {
            Some(copy) => Ok(Some(self.populate(copy).await?)),
            None => Ok(None),
        }
    }

    /// Books by title, for the form select
    async fn choices(&self) -> AppResult<Vec<Book>> {
        let mut books = self.repository.books.find_all().await?;
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }
}

fn statuses(selected: Option<&str>) -> Vec<Value> {
    CopyStatus::ALL
        .iter()
        .map(|s| json!({"name": s.as_str(), "selected": Some(s.as_str()) == selected}))
        .collect()
}

fn form_view(
    title: &str,
    books: &[Book],
    submitted: Option<&BookCopyForm>,
    errors: &[FieldError],
) -> AppResult<View> {
    let book_list: Vec<Value> = books
        .iter()
        .map(|b| choice(b, "selected", submitted.is_some_and(|f| f.book == b.id.as_str())))
        .collect::<AppResult<_>>()?;

    Ok(View::new(
        "bookcopy_form",
        json!({
            "title": title,
            "book_list": book_list,
            "statuses": statuses(submitted.map(|f| f.status.as_str())),
            "bookcopy": submitted,
            "errors": errors,
        }),
    ))
}
