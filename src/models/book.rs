//! Book model, its expanded form and the book form

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

use super::{
    author::Author,
    genre::Genre,
    record::{Record, RecordId},
};
use crate::{
    error::AppResult,
    validation::{escape_html, sanitize, Form, Submission},
    views::{present, present_all},
};

/// Book record. Genre references keep submission order and may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: RecordId,
    pub title: String,
    #[sqlx(rename = "author_id")]
    pub author: RecordId,
    pub summary: String,
    pub isbn: String,
    #[serde(rename = "genre")]
    #[sqlx(rename = "genre_ids")]
    pub genres: Vec<RecordId>,
}

#[derive(Debug, Clone)]
pub enum BookFilter {
    Author(RecordId),
    Genre(RecordId),
}

impl Record for Book {
    type Filter = BookFilter;
    const KIND: &'static str = "book";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn matches(&self, filter: &BookFilter) -> bool {
        match filter {
            BookFilter::Author(id) => self.author == *id,
            BookFilter::Genre(id) => self.genres.contains(id),
        }
    }
}

/// Book with its author and genres resolved.
///
/// A dangling author reference resolves to `None`; dangling genre
/// references are left out of `genres`.
#[derive(Debug, Clone)]
pub struct PopulatedBook {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
}

impl PopulatedBook {
    pub fn present(&self) -> AppResult<Value> {
        let mut value = present(&self.book)?;
        if let Value::Object(fields) = &mut value {
            fields.insert(
                "author".to_string(),
                self.author.as_ref().map(present).transpose()?.unwrap_or(Value::Null),
            );
            fields.insert("genre".to_string(), Value::Array(present_all(&self.genres)?));
        }
        Ok(value)
    }
}

/// Sanitized book form submission
#[derive(Debug, Clone, Serialize, Validate)]
pub struct BookForm {
    #[validate(length(min = 1, message = "Title must not be empty."))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty."))]
    pub author: String,
    #[validate(length(min = 1, message = "Summary must not be empty."))]
    pub summary: String,
    #[validate(length(min = 1, message = "ISBN must not be empty."))]
    pub isbn: String,
    pub genre: Vec<String>,
}

impl Form for BookForm {
    const FIELDS: &'static [&'static str] = &["title", "author", "summary", "isbn", "genre"];

    fn from_submission(submission: &Submission) -> Self {
        Self {
            title: sanitize(submission.text("title")),
            author: sanitize(submission.text("author")),
            summary: sanitize(submission.text("summary")),
            isbn: sanitize(submission.text("isbn")),
            genre: submission
                .list("genre")
                .iter()
                .map(|g| escape_html(g))
                .collect(),
        }
    }
}

impl BookForm {
    pub fn to_book(&self, id: RecordId) -> Book {
        Book {
            id,
            title: self.title.clone(),
            author: RecordId::from(self.author.as_str()),
            summary: self.summary.clone(),
            isbn: self.isbn.clone(),
            genres: self.genre.iter().map(|g| RecordId::from(g.as_str())).collect(),
        }
    }

    pub fn has_genre(&self, id: &RecordId) -> bool {
        self.genre.iter().any(|g| g == id.as_str())
    }
}
