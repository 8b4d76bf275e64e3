//! PostgreSQL record store

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use std::{convert::Infallible, marker::PhantomData};

use super::RecordStore;
use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, BookCopy, BookFilter, CopyFilter, Genre, GenreFilter, Record, RecordId},
};

/// Store for one collection, sharing the pool with the others
pub struct PgStore<R> {
    pool: Pool<Postgres>,
    _record: PhantomData<fn() -> R>,
}

impl<R> PgStore<R> {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

/// Unique violations become `Conflict`, everything else stays a database error
fn write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return AppError::Conflict(db.message().to_string());
        }
    }
    AppError::Database(err)
}

/// An update that touched no row means the record is gone
fn updated(rows: u64, kind: &str, id: &RecordId) -> AppResult<()> {
    if rows == 0 {
        return Err(AppError::NotFound(format!("{} {} not found", kind, id)));
    }
    Ok(())
}

fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or_default()
}

// =============================================================================
// AUTHORS
// =============================================================================

const AUTHOR_COLUMNS: &str = "id, first_name, family_name, date_of_birth, date_of_death";

#[async_trait]
impl RecordStore<Author> for PgStore<Author> {
    async fn find_all(&self) -> AppResult<Vec<Author>> {
        let query = format!("SELECT {} FROM authors ORDER BY seq", AUTHOR_COLUMNS);
        Ok(sqlx::query_as::<_, Author>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: &RecordId) -> AppResult<Option<Author>> {
        let query = format!("SELECT {} FROM authors WHERE id = $1", AUTHOR_COLUMNS);
        Ok(sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by(&self, filter: &Infallible) -> AppResult<Vec<Author>> {
        match *filter {}
    }

    async fn count(&self, filter: Option<&Infallible>) -> AppResult<u64> {
        if let Some(filter) = filter {
            match *filter {}
        }
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(to_count(n))
    }

    async fn save(&self, author: &Author) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO authors (id, first_name, family_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                family_name = EXCLUDED.family_name,
                date_of_birth = EXCLUDED.date_of_birth,
                date_of_death = EXCLUDED.date_of_death
            "#,
        )
        .bind(&author.id)
        .bind(&author.first_name)
        .bind(&author.family_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(())
    }

    async fn update(&self, author: &Author) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE authors
            SET first_name = $2, family_name = $3, date_of_birth = $4, date_of_death = $5
            WHERE id = $1
            "#,
        )
        .bind(&author.id)
        .bind(&author.first_name)
        .bind(&author.family_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        updated(result.rows_affected(), Author::KIND, &author.id)
    }

    async fn delete(&self, id: &RecordId) -> AppResult<()> {
        sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// GENRES
// =============================================================================

#[async_trait]
impl RecordStore<Genre> for PgStore<Genre> {
    async fn find_all(&self) -> AppResult<Vec<Genre>> {
        Ok(
            sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY seq")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_by_id(&self, id: &RecordId) -> AppResult<Option<Genre>> {
        Ok(
            sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_by(&self, filter: &GenreFilter) -> AppResult<Vec<Genre>> {
        let GenreFilter::Name(name) = filter;
        Ok(
            sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE name = $1 ORDER BY seq")
                .bind(name)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn count(&self, filter: Option<&GenreFilter>) -> AppResult<u64> {
        let n = match filter {
            Some(GenreFilter::Name(name)) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM genres WHERE name = $1")
                    .bind(name)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM genres")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(to_count(n))
    }

    async fn save(&self, genre: &Genre) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO genres (id, name) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(&genre.id)
        .bind(&genre.name)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(())
    }

    async fn update(&self, genre: &Genre) -> AppResult<()> {
        let result = sqlx::query("UPDATE genres SET name = $2 WHERE id = $1")
            .bind(&genre.id)
            .bind(&genre.name)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        updated(result.rows_affected(), Genre::KIND, &genre.id)
    }

    async fn delete(&self, id: &RecordId) -> AppResult<()> {
        sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// BOOKS
// =============================================================================

const BOOK_COLUMNS: &str = "id, title, author_id, summary, isbn, genre_ids";

fn book_condition(filter: &BookFilter) -> (&'static str, &RecordId) {
    match filter {
        BookFilter::Author(id) => ("author_id = $1", id),
        BookFilter::Genre(id) => ("$1 = ANY(genre_ids)", id),
    }
}

#[async_trait]
impl RecordStore<Book> for PgStore<Book> {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let query = format!("SELECT {} FROM books ORDER BY seq", BOOK_COLUMNS);
        Ok(sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: &RecordId) -> AppResult<Option<Book>> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        Ok(sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let (condition, id) = book_condition(filter);
        let query = format!(
            "SELECT {} FROM books WHERE {} ORDER BY seq",
            BOOK_COLUMNS, condition
        );
        Ok(sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count(&self, filter: Option<&BookFilter>) -> AppResult<u64> {
        let n = match filter {
            Some(filter) => {
                let (condition, id) = book_condition(filter);
                let query = format!("SELECT COUNT(*) FROM books WHERE {}", condition);
                sqlx::query_scalar::<_, i64>(&query)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(to_count(n))
    }

    async fn save(&self, book: &Book) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO books (id, title, author_id, summary, isbn, genre_ids)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                author_id = EXCLUDED.author_id,
                summary = EXCLUDED.summary,
                isbn = EXCLUDED.isbn,
                genre_ids = EXCLUDED.genre_ids
            "#,
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(&book.genres)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(())
    }

    async fn update(&self, book: &Book) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author_id = $3, summary = $4, isbn = $5, genre_ids = $6
            WHERE id = $1
            "#,
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(&book.genres)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        updated(result.rows_affected(), Book::KIND, &book.id)
    }

    async fn delete(&self, id: &RecordId) -> AppResult<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// BOOK COPIES
// =============================================================================

const COPY_COLUMNS: &str = "id, book_id, imprint, status, due_back";

#[async_trait]
impl RecordStore<BookCopy> for PgStore<BookCopy> {
    async fn find_all(&self) -> AppResult<Vec<BookCopy>> {
        let query = format!("SELECT {} FROM book_copies ORDER BY seq", COPY_COLUMNS);
        Ok(sqlx::query_as::<_, BookCopy>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: &RecordId) -> AppResult<Option<BookCopy>> {
        let query = format!("SELECT {} FROM book_copies WHERE id = $1", COPY_COLUMNS);
        Ok(sqlx::query_as::<_, BookCopy>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by(&self, filter: &CopyFilter) -> AppResult<Vec<BookCopy>> {
        let rows = match filter {
            CopyFilter::Book(id) => {
                let query = format!(
                    "SELECT {} FROM book_copies WHERE book_id = $1 ORDER BY seq",
                    COPY_COLUMNS
                );
                sqlx::query_as::<_, BookCopy>(&query)
                    .bind(id)
                    .fetch_all(&self.pool)
                    .await?
            }
            CopyFilter::Status(status) => {
                let query = format!(
                    "SELECT {} FROM book_copies WHERE status = $1 ORDER BY seq",
                    COPY_COLUMNS
                );
                sqlx::query_as::<_, BookCopy>(&query)
                    .bind(*status)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn count(&self, filter: Option<&CopyFilter>) -> AppResult<u64> {
        let n = match filter {
            Some(CopyFilter::Book(id)) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM book_copies WHERE book_id = $1")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?
            }
            Some(CopyFilter::Status(status)) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM book_copies WHERE status = $1")
                    .bind(*status)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM book_copies")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(to_count(n))
    }

    async fn save(&self, copy: &BookCopy) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO book_copies (id, book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                book_id = EXCLUDED.book_id,
                imprint = EXCLUDED.imprint,
                status = EXCLUDED.status,
                due_back = EXCLUDED.due_back
            "#,
        )
        .bind(&copy.id)
        .bind(&copy.book)
        .bind(&copy.imprint)
        .bind(copy.status)
        .bind(copy.due_back)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        Ok(())
    }

    async fn update(&self, copy: &BookCopy) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE book_copies
            SET book_id = $2, imprint = $3, status = $4, due_back = $5
            WHERE id = $1
            "#,
        )
        .bind(&copy.id)
        .bind(&copy.book)
        .bind(&copy.imprint)
        .bind(copy.status)
        .bind(copy.due_back)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        updated(result.rows_affected(), BookCopy::KIND, &copy.id)
    }

    async fn delete(&self, id: &RecordId) -> AppResult<()> {
        sqlx::query("DELETE FROM book_copies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
