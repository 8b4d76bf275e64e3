//! Catalog data models

pub mod author;
pub mod book;
pub mod book_copy;
pub mod genre;
pub mod record;

// Re-export commonly used types
pub use author::{Author, AuthorForm};
pub use book::{Book, BookFilter, BookForm, PopulatedBook};
pub use book_copy::{BookCopy, BookCopyForm, CopyFilter, CopyStatus, PopulatedCopy};
pub use genre::{Genre, GenreFilter, GenreForm};
pub use record::{Record, RecordId};
