//! Book copy pages. Copies have no dependents, so deletes are unconditional.

use std::{collections::HashMap, sync::Arc};

use crate::{
    error::{AppError, AppResult},
    models::{
        book_copy::{BookCopyEntry, BookCopyFormView},
        catalog::location,
        Book, BookCopy, BookCopyForm, BookCopyStatus, DeleteOutcome, EntityKind, FormOutcome,
    },
    repository::CatalogStore,
    validation::FieldError,
};

const ADD_TITLE: &str = "Add book copy entry";
const UPDATE_TITLE: &str = "Edit copy";

#[derive(Clone)]
pub struct BookCopiesService {
    store: Arc<dyn CatalogStore>,
}

impl BookCopiesService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Every copy in insertion order, with its book when it resolves
    pub async fn list(&self) -> AppResult<Vec<BookCopyEntry>> {
        let copies = self.store.book_copies_list().await?;
        let mut book_ids: Vec<i32> = copies.iter().map(|c| c.book_id).collect();
        book_ids.sort_unstable();
        book_ids.dedup();
        let books: HashMap<i32, Book> = self
            .store
            .books_get_many(&book_ids)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        Ok(copies
            .into_iter()
            .map(|copy| BookCopyEntry {
                url: copy.url(),
                book: books.get(&copy.book_id).cloned(),
                copy,
            })
            .collect())
    }

    pub async fn find(&self, id: i32) -> AppResult<BookCopyEntry> {
        let copy = self.get(id).await?;
        let book = self.store.books_get(copy.book_id).await?;
        Ok(BookCopyEntry {
            url: copy.url(),
            book,
            copy,
        })
    }

    pub async fn show_add_form(&self) -> AppResult<BookCopyFormView> {
        self.form_view(ADD_TITLE, BookCopyForm::default(), Vec::new())
            .await
    }

    pub async fn show_update_form(&self, id: i32) -> AppResult<BookCopyFormView> {
        let copy = self.get(id).await?;
        self.form_view(UPDATE_TITLE, BookCopyForm::from(&copy), Vec::new())
            .await
    }

    pub async fn add(&self, form: &BookCopyForm) -> AppResult<FormOutcome<BookCopyFormView>> {
        let data = match form.validate() {
            Ok(data) => data,
            Err(errors) => {
                let view = self
                    .form_view(ADD_TITLE, form.clone(), errors.into_vec())
                    .await?;
                return Ok(FormOutcome::Invalid(view));
            }
        };
        let copy = self.store.book_copies_create(&data).await?;
        tracing::info!(
            "Book copy created: id={} book_id={} status={}",
            copy.id,
            copy.book_id,
            copy.status
        );
        Ok(FormOutcome::saved(copy.url()))
    }

    pub async fn update(
        &self,
        id: i32,
        form: &BookCopyForm,
    ) -> AppResult<FormOutcome<BookCopyFormView>> {
        self.get(id).await?;
        let data = match form.validate() {
            Ok(data) => data,
            Err(errors) => {
                let view = self
                    .form_view(UPDATE_TITLE, form.clone(), errors.into_vec())
                    .await?;
                return Ok(FormOutcome::Invalid(view));
            }
        };
        let copy = self
            .store
            .book_copies_update(id, &data)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::BookCopy, id))?;
        tracing::info!("Book copy updated: id={} status={}", id, copy.status);
        Ok(FormOutcome::saved(copy.url()))
    }

    /// Remove the copy and go back to the book it belonged to
    pub async fn delete(&self, id: i32) -> AppResult<DeleteOutcome> {
        let copy = self.get(id).await?;
        if !self.store.book_copies_delete(id).await? {
            return Err(AppError::not_found(EntityKind::BookCopy, id));
        }
        tracing::info!("Book copy deleted: id={} book_id={}", id, copy.book_id);
        Ok(DeleteOutcome::Deleted {
            location: location(EntityKind::Book, copy.book_id),
        })
    }

    async fn get(&self, id: i32) -> AppResult<BookCopy> {
        self.store
            .book_copies_get(id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::BookCopy, id))
    }

    async fn form_view(
        &self,
        title: &str,
        copy: BookCopyForm,
        errors: Vec<FieldError>,
    ) -> AppResult<BookCopyFormView> {
        let mut books = self.store.books_list().await?;
        books.sort_by_key(|b| b.title.to_lowercase());
        Ok(BookCopyFormView {
            title: title.to_string(),
            copy,
            books,
            statuses: BookCopyStatus::ALL.to_vec(),
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::BookForm,
        repository::memory::MemoryStore,
        services::{test_support::saved_id, Services},
    };

    async fn add_book(services: &Services, title: &str) -> i32 {
        let form = BookForm {
            title: Some(title.to_string()),
            author: Some("1".to_string()),
            summary: Some("summary".to_string()),
            isbn: Some("isbn".to_string()),
            genre: Vec::new(),
        };
        saved_id(services.books.add(&form).await.unwrap())
    }

    fn copy_form(book: i32, status: &str, due_back: &str) -> BookCopyForm {
        BookCopyForm {
            book: Some(book.to_string()),
            imprint: Some("Vintage, 1990".to_string()),
            status: Some(status.to_string()),
            due_back: Some(due_back.to_string()),
        }
    }

    #[tokio::test]
    async fn test_add_defaults_to_maintenance() {
        let services = Services::new(MemoryStore::new());
        let book = add_book(&services, "Beloved").await;
        let id = saved_id(services.book_copies.add(&copy_form(book, "", "")).await.unwrap());

        let entry = services.book_copies.find(id).await.unwrap();
        assert_eq!(entry.copy.status, BookCopyStatus::Maintenance);
        assert_eq!(entry.copy.due_back, None);
        assert_eq!(entry.book.map(|b| b.title), Some("Beloved".to_string()));
    }

    #[tokio::test]
    async fn test_find_missing_copy_is_not_found() {
        let services = Services::new(MemoryStore::new());
        assert!(matches!(
            services.book_copies.find(77).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_returns_to_parent_book() {
        let services = Services::new(MemoryStore::new());
        let book = add_book(&services, "Beloved").await;
        let keep = saved_id(
            services
                .book_copies
                .add(&copy_form(book, "Available", ""))
                .await
                .unwrap(),
        );
        let gone = saved_id(
            services
                .book_copies
                .add(&copy_form(book, "Loaned", "2030-01-15"))
                .await
                .unwrap(),
        );

        let outcome = services.book_copies.delete(gone).await.unwrap();
        assert_eq!(outcome.location(), format!("/catalog/book/{}", book));

        let detail = services.books.find(book, None).await.unwrap();
        let ids: Vec<i32> = detail.copies.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![keep]);
        assert!(matches!(
            services.book_copies.delete(gone).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_copy_keeps_reference_lists() {
        let services = Services::new(MemoryStore::new());
        add_book(&services, "zorba").await;
        add_book(&services, "Atonement").await;

        let outcome = services
            .book_copies
            .add(&copy_form(1, "Lost", "soon"))
            .await
            .unwrap();
        match outcome {
            FormOutcome::Invalid(view) => {
                let titles: Vec<&str> = view.books.iter().map(|b| b.title.as_str()).collect();
                assert_eq!(titles, vec!["Atonement", "zorba"]);
                assert_eq!(view.statuses.len(), 4);
                assert_eq!(view.copy.status.as_deref(), Some("Lost"));
                let messages: Vec<&str> = view.errors.iter().map(|e| e.message.as_str()).collect();
                assert!(messages.contains(&"Status is invalid."));
                assert!(messages.contains(&"Date is invalid"));
            }
            FormOutcome::Saved { .. } => panic!("invalid copy was saved"),
        }
        assert!(services.book_copies.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_resolves_books() {
        let services = Services::new(MemoryStore::new());
        let book = add_book(&services, "Beloved").await;
        services
            .book_copies
            .add(&copy_form(book, "Reserved", ""))
            .await
            .unwrap();
        services
            .book_copies
            .add(&copy_form(999, "Available", ""))
            .await
            .unwrap();

        let entries = services.book_copies.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].book.is_some());
        assert!(entries[1].book.is_none());
    }
}
