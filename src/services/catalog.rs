//! Catalog home page: record counts and store health

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{catalog::CatalogSummary, BookCopyStatus},
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Counts of every collection, plus copies currently available
    pub async fn summary(&self) -> AppResult<CatalogSummary> {
        let (book_count, book_copy_count, book_copy_available_count, author_count, genre_count) =
            tokio::try_join!(
                self.store.books_count(),
                self.store.book_copies_count(),
                self.store
                    .book_copies_count_by_status(BookCopyStatus::Available),
                self.store.authors_count(),
                self.store.genres_count(),
            )?;
        Ok(CatalogSummary {
            book_count,
            book_copy_count,
            book_copy_available_count,
            author_count,
            genre_count,
        })
    }

    /// Round trip to the store, for readiness checks
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{BookCopyForm, BookForm, GenreForm},
        repository::memory::MemoryStore,
        services::{test_support::saved_id, Services},
    };
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_empty_catalog() {
        let services = Services::new(MemoryStore::new());
        let summary = services.catalog.summary().await.unwrap();
        assert_eq!(
            summary,
            CatalogSummary {
                book_count: 0,
                book_copy_count: 0,
                book_copy_available_count: 0,
                author_count: 0,
                genre_count: 0,
            }
        );
        assert_ok!(services.catalog.ping().await);
    }

    #[tokio::test]
    async fn test_summary_counts_available_copies() {
        let services = Services::new(MemoryStore::new());
        services
            .genres
            .add(&GenreForm {
                name: Some("Fantasy".to_string()),
            })
            .await
            .unwrap();
        let book = saved_id(
            services
                .books
                .add(&BookForm {
                    title: Some("The Hobbit".to_string()),
                    author: Some("1".to_string()),
                    summary: Some("There and back again".to_string()),
                    isbn: Some("9780261103344".to_string()),
                    genre: Vec::new(),
                })
                .await
                .unwrap(),
        );
        for status in ["Available", "Available", "Maintenance"] {
            let form = BookCopyForm {
                book: Some(book.to_string()),
                imprint: Some("Allen & Unwin".to_string()),
                status: Some(status.to_string()),
                due_back: None,
            };
            assert_ok!(services.book_copies.add(&form).await);
        }

        let summary = services.catalog.summary().await.unwrap();
        assert_eq!(summary.book_count, 1);
        assert_eq!(summary.book_copy_count, 3);
        assert_eq!(summary.book_copy_available_count, 2);
        assert_eq!(summary.author_count, 0);
        assert_eq!(summary.genre_count, 1);
    }
}
