//! Record store layer.
//!
//! Each collection is reached through a [`RecordStore`] handle. The
//! [`Repository`] bundles one handle per collection and is handed to the
//! services at construction; swapping a handle swaps the backend for that
//! collection only.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Author, Book, BookCopy, Genre, Record, RecordId},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence operations for one collection
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Every record, in store order
    async fn find_all(&self) -> AppResult<Vec<R>>;

    async fn find_by_id(&self, id: &RecordId) -> AppResult<Option<R>>;

    /// Records matching `filter`, in store order
    async fn find_by(&self, filter: &R::Filter) -> AppResult<Vec<R>>;

    async fn count(&self, filter: Option<&R::Filter>) -> AppResult<u64>;

    /// Insert, or overwrite every field of the record stored under the same id.
    ///
    /// Fails with `AppError::Conflict` when another record already holds the
    /// same natural key.
    async fn save(&self, record: &R) -> AppResult<()>;

    /// Overwrite every field of an existing record.
    ///
    /// Fails with `AppError::NotFound` when no record is stored under the id,
    /// and with `AppError::Conflict` like [`RecordStore::save`].
    async fn update(&self, record: &R) -> AppResult<()>;

    /// Remove by id. Removing an absent id is not an error.
    async fn delete(&self, id: &RecordId) -> AppResult<()>;
}

/// One store handle per collection
#[derive(Clone)]
pub struct Repository {
    pub authors: Arc<dyn RecordStore<Author>>,
    pub genres: Arc<dyn RecordStore<Genre>>,
    pub books: Arc<dyn RecordStore<Book>>,
    pub copies: Arc<dyn RecordStore<BookCopy>>,
}

impl Repository {
    /// Process-local collections
    pub fn in_memory() -> Self {
        Self {
            authors: Arc::new(MemoryStore::<Author>::new()),
            genres: Arc::new(MemoryStore::<Genre>::new()),
            books: Arc::new(MemoryStore::<Book>::new()),
            copies: Arc::new(MemoryStore::<BookCopy>::new()),
        }
    }

    /// Collections backed by the given PostgreSQL pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            authors: Arc::new(PgStore::<Author>::new(pool.clone())),
            genres: Arc::new(PgStore::<Genre>::new(pool.clone())),
            books: Arc::new(PgStore::<Book>::new(pool.clone())),
            copies: Arc::new(PgStore::<BookCopy>::new(pool)),
        }
    }
}
