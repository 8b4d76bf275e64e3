//! Entity controllers: read, create, delete and update flows per collection

pub mod authors;
pub mod book_copies;
pub mod books;
pub mod catalog;
pub mod genres;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub books: books::BooksService,
    pub genres: genres::GenresService,
    pub authors: authors::AuthorsService,
    pub book_copies: book_copies::BookCopiesService,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            genres: genres::GenresService::new(repository.clone()),
            authors: authors::AuthorsService::new(repository.clone()),
            book_copies: book_copies::BookCopiesService::new(repository),
        }
    }
}
