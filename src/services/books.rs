//! Book pages. Books reference one author and any number of genres; neither
//! reference is checked on write.

use std::{collections::HashMap, sync::Arc};

use super::integrity::IntegrityGuard;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookDetail, BookFormView, BookListEntry},
        genre::GenreOption,
        Author, Book, BookForm, DeleteOutcome, EntityKind, FormOutcome, Genre, Notice,
    },
    repository::CatalogStore,
    validation::FieldError,
};

const ADD_TITLE: &str = "Add book entry";
const UPDATE_TITLE: &str = "Update Book";

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn CatalogStore>,
    guard: IntegrityGuard,
}

impl BooksService {
    pub fn new(store: Arc<dyn CatalogStore>, guard: IntegrityGuard) -> Self {
        Self { store, guard }
    }

    /// All books ordered by title, each with its author when it resolves
    pub async fn list(&self) -> AppResult<Vec<BookListEntry>> {
        let books = self.store.books_list().await?;
        let mut author_ids: Vec<i32> = books.iter().map(|b| b.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors: HashMap<i32, Author> = self
            .store
            .authors_get_many(&author_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(books
            .into_iter()
            .map(|book| BookListEntry {
                url: book.url(),
                author: authors.get(&book.author_id).cloned(),
                book,
            })
            .collect())
    }

    /// Book with author, genres and copies. A dangling author reference
    /// yields `author: None`.
    pub async fn find(&self, id: i32, notice: Option<Notice>) -> AppResult<BookDetail> {
        let book = self.get(id).await?;
        let author = self.store.authors_get(book.author_id).await?;
        let genres = self.store.genres_get_many(&book.genre_ids).await?;
        let copies = self.store.book_copies_by_book(id).await?;
        Ok(BookDetail {
            url: book.url(),
            author,
            genres,
            copies,
            notice,
            book,
        })
    }

    pub async fn show_add_form(&self) -> AppResult<BookFormView> {
        self.form_view(ADD_TITLE, BookForm::default(), Vec::new())
            .await
    }

    pub async fn show_update_form(&self, id: i32) -> AppResult<BookFormView> {
        let book = self.get(id).await?;
        self.form_view(UPDATE_TITLE, BookForm::from(&book), Vec::new())
            .await
    }

    pub async fn add(&self, form: &BookForm) -> AppResult<FormOutcome<BookFormView>> {
        let data = match form.validate() {
            Ok(data) => data,
            Err(errors) => {
                let view = self
                    .form_view(ADD_TITLE, form.clone(), errors.into_vec())
                    .await?;
                return Ok(FormOutcome::Invalid(view));
            }
        };
        let book = self.store.books_create(&data).await?;
        tracing::info!("Book created: id={} author_id={}", book.id, book.author_id);
        Ok(FormOutcome::saved(book.url()))
    }

    pub async fn update(&self, id: i32, form: &BookForm) -> AppResult<FormOutcome<BookFormView>> {
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
        let book = self
            .store
            .books_update(id, &data)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Book, id))?;
        tracing::info!("Book updated: id={}", id);
        Ok(FormOutcome::saved(book.url()))
    }

    /// Refused while any copy of the book exists
    pub async fn delete(&self, id: i32) -> AppResult<DeleteOutcome> {
        self.get(id).await?;
        self.guard
            .delete_with(EntityKind::Book, id, || {
                self.store.books_delete_unreferenced(id)
            })
            .await
    }

    async fn get(&self, id: i32) -> AppResult<Book> {
        self.store
            .books_get(id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Book, id))
    }

    /// Form with every author and genre to pick from; genres named by the
    /// form come back checked.
    async fn form_view(
        &self,
        title: &str,
        book: BookForm,
        errors: Vec<FieldError>,
    ) -> AppResult<BookFormView> {
        let mut authors = self.store.authors_list().await?;
        authors.sort_by_key(|a| a.family_name.to_lowercase());
        let selected = book.selected_genres();
        let genres = self
            .store
            .genres_list()
            .await?
            .into_iter()
            .map(|genre: Genre| GenreOption {
                checked: selected.contains(&genre.id),
                genre,
            })
            .collect();
        Ok(BookFormView {
            title: title.to_string(),
            book,
            authors,
            genres,
            errors,
        })
    }
}
