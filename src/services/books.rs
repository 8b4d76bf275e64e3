//! Book pages: list, detail, create, delete and update

use futures::future::try_join_all;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{
        Author, Book, BookCopy, BookForm, CopyFilter, Genre, PopulatedBook, Record, RecordId,
    },
    repository::{RecordStore, Repository},
    validation::{check, FieldError, Submission},
    views::{choice, present, present_all, Page, View},
};

const LIST_URL: &str = "/catalog/books";

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All books in store order, authors and genres resolved
    pub async fn list(&self) -> AppResult<Page> {
        let books = self.repository.books.find_all().await?;
        let books = try_join_all(books.into_iter().map(|book| self.populate(book))).await?;

        Ok(Page::Render(View::new(
            "book_list",
            json!({
                "title": "Book List",
                "book_list": books.iter().map(PopulatedBook::present).collect::<AppResult<Vec<_>>>()?,
            }),
        )))
    }

    /// Book with its copies
    pub async fn detail(&self, id: &str) -> AppResult<Page> {
        let id = RecordId::from(id);
        let of_book = CopyFilter::Book(id.clone());
        let (book, copies) = tokio::try_join!(
            self.find_populated(&id),
            self.repository.copies.find_by(&of_book),
        )?;
        let book = book.ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        Ok(Page::Render(View::new(
            "book_detail",
            json!({
                "title": book.book.title,
                "book": book.present()?,
                "book_instances": present_all(&copies)?,
            }),
        )))
    }

    pub async fn create_form(&self) -> AppResult<Page> {
        let (authors, genres) = self.choices().await?;
        Ok(Page::Render(form_view(
            "Create Book",
            &authors,
            &genres,
            None,
            &[],
        )?))
    }

    pub async fn create(&self, submission: &Submission) -> AppResult<Page> {
        let checked = check::<BookForm>(submission);

        if !checked.is_valid() {
            let (authors, genres) = self.choices().await?;
            return Ok(Page::Render(form_view(
                "Create Book",
                &authors,
                &genres,
                Some(&checked.form),
                &checked.errors,
            )?));
        }

        let book = checked.form.to_book(RecordId::generate());
        self.repository.books.save(&book).await?;
        tracing::info!("Created book id={} title={:?}", book.id, book.title);
        Ok(Page::redirect(book.url()))
    }

    /// Confirmation page; an unknown book sends the user back to the list
    pub async fn delete_form(&self, id: &str) -> AppResult<Page> {
        let id = RecordId::from(id);
        let (book, copies) = self.with_copies(&id).await?;
        match book {
            Some(book) => Ok(Page::Render(delete_view(&book, &copies)?)),
            None => Ok(Page::redirect(LIST_URL)),
        }
    }

    /// Delete the book named by `bookid` in the body unless copies still refer to it
    pub async fn delete(&self, submission: &Submission) -> AppResult<Page> {
        let id = submission.identity("bookid")?;
        let (book, copies) = self.with_copies(&id).await?;
        let Some(book) = book else {
            return Ok(Page::redirect(LIST_URL));
        };

        if !copies.is_empty() {
            tracing::info!(
                "Not deleting book id={}: {} copies depend on it",
                id,
                copies.len()
            );
            return Ok(Page::Render(delete_view(&book, &copies)?));
        }

        self.repository.books.delete(&id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(Page::redirect(LIST_URL))
    }

    pub async fn update_form(&self, id: &str) -> AppResult<Page> {
        let id = RecordId::from(id);
        let (book, (authors, genres)) =
            tokio::try_join!(self.find_populated(&id), self.choices())?;
        let book = book.ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        let authors: Vec<Value> = authors
            .iter()
            .map(|a| choice(a, "selected", a.id == book.book.author))
            .collect::<AppResult<_>>()?;
        let genres: Vec<Value> = genres
            .iter()
            .map(|g| choice(g, "checked", book.genres.iter().any(|own| own.id == g.id)))
            .collect::<AppResult<_>>()?;

        Ok(Page::Render(View::new(
            "book_form",
            json!({
                "title": "Update Book",
                "authors": authors,
                "genres": genres,
                "book": present(&book.book)?,
                "errors": [],
            }),
        )))
    }

    /// Full overwrite of the book stored under `id`; the id itself never changes
    pub async fn update(&self, id: &str, submission: &Submission) -> AppResult<Page> {
        let checked = check::<BookForm>(submission);

        if !checked.is_valid() {
            let (authors, genres) = self.choices().await?;
            return Ok(Page::Render(form_view(
                "Update Book",
                &authors,
                &genres,
                Some(&checked.form),
                &checked.errors,
            )?));
        }

        let book = checked.form.to_book(RecordId::from(id));
        self.repository.books.update(&book).await?;
        tracing::info!("Updated book id={}", book.id);
        Ok(Page::redirect(book.url()))
    }

    async fn populate(&self, book: Book) -> AppResult<PopulatedBook> {
        let (author, genres) = tokio::try_join!(
            self.repository.authors.find_by_id(&book.author),
            try_join_all(book.genres.iter().map(|id| self.repository.genres.find_by_id(id))),
        )?;
        Ok(PopulatedBook {
            book,
            author,
            genres: genres.into_iter().flatten().collect(),
        })
    }

    async fn find_populated(&self, id: &RecordId) -> AppResult<Option<PopulatedBook>> {
        match self.repository.books.find_by_id(id).await? {
            Some(book) => Ok(Some(self.populate(book).await?)),
            None => Ok(None),
        }
    }

    async fn with_copies(&self, id: &RecordId) -> AppResult<(Option<Book>, Vec<BookCopy>)> {
        let of_book = CopyFilter::Book(id.clone());
        tokio::try_join!(
            self.repository.books.find_by_id(id),
            self.repository.copies.find_by(&of_book),
        )
    }

    /// Authors by family name and genres by name, for the form selects
    async fn choices(&self) -> AppResult<(Vec<Author>, Vec<Genre>)> {
        let (mut authors, mut genres) = tokio::try_join!(
            self.repository.authors.find_all(),
            self.repository.genres.find_all(),
        )?;
        authors.sort_by(|a, b| a.family_name.cmp(&b.family_name));
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok((authors, genres))
    }
}

/// Book form, with the submitted choices marked when re-rendering a rejected submission
fn form_view(
    title: &str,
    authors: &[Author],
    genres: &[Genre],
    submitted: Option<&BookForm>,
    errors: &[FieldError],
) -> AppResult<View> {
    let authors: Vec<Value> = authors
        .iter()
        .map(|a| choice(a, "selected", submitted.is_some_and(|f| f.author == a.id.as_str())))
        .collect::<AppResult<_>>()?;
    let genres: Vec<Value> = genres
        .iter()
        .map(|g| choice(g, "checked", submitted.is_some_and(|f| f.has_genre(&g.id))))
        .collect::<AppResult<_>>()?;

    Ok(View::new(
        "book_form",
        json!({
            "title": title,
            "authors": authors,
            "genres": genres,
            "book": submitted,
            "errors": errors,
        }),
    ))
}

fn delete_view(book: &Book, copies: &[BookCopy]) -> AppResult<View> {
    Ok(View::new(
        "book_delete",
        json!({
            "title": "Delete Book",
            "book": present(book)?,
            "book_instances": present_all(copies)?,
        }),
    ))
}
