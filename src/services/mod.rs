//! Business logic services

pub mod authors;
pub mod book_copies;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod integrity;

use std::sync::Arc;

use crate::repository::{CatalogStore, DependentCounter};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub book_copies: book_copies::BookCopiesService,
    pub genres: genres::GenresService,
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services over one shared store
    pub fn new<S: CatalogStore + 'static>(store: S) -> Self {
        let store = Arc::new(store);
        let counter: Arc<dyn DependentCounter> = store.clone();
        let guard = integrity::IntegrityGuard::new(counter);
        let store: Arc<dyn CatalogStore> = store;

        Self {
            authors: authors::AuthorsService::new(store.clone(), guard.clone()),
            books: books::BooksService::new(store.clone(), guard.clone()),
            book_copies: book_copies::BookCopiesService::new(store.clone()),
            genres: genres::GenresService::new(store.clone(), guard),
            catalog: catalog::CatalogService::new(store),
        }
    }
}
