//! Genre pages. Genre names are unique: submitting a name that already
//! exists resolves to the existing genre instead of writing anything.

use std::sync::Arc;

use super::integrity::IntegrityGuard;
use crate::{
    error::{AppError, AppResult},
    models::{
        genre::{GenreDetail, GenreFormView},
        DeleteOutcome, EntityKind, FormOutcome, Genre, GenreForm, Notice,
    },
    repository::CatalogStore,
    validation::FieldError,
};

const ADD_TITLE: &str = "Add a genre entry";
const UPDATE_TITLE: &str = "Edit genre entry";

#[derive(Clone)]
pub struct GenresService {
    store: Arc<dyn CatalogStore>,
    guard: IntegrityGuard,
}

impl GenresService {
    pub fn new(store: Arc<dyn CatalogStore>, guard: IntegrityGuard) -> Self {
        Self { store, guard }
    }

    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        self.store.genres_list().await
    }

    /// Genre with the books tagged with it
    pub async fn find(&self, id: i32, notice: Option<Notice>) -> AppResult<GenreDetail> {
        let genre = self.get(id).await?;
        let books = self.store.books_by_genre(id).await?;
        Ok(GenreDetail {
            url: genre.url(),
            genre,
            books,
            notice,
        })
    }

    pub fn show_add_form(&self) -> GenreFormView {
        form_view(ADD_TITLE, GenreForm::default(), Vec::new())
    }

    pub async fn show_update_form(&self, id: i32) -> AppResult<GenreFormView> {
        let genre = self.get(id).await?;
        Ok(form_view(UPDATE_TITLE, GenreForm::from(&genre), Vec::new()))
    }

    pub async fn add(&self, form: &GenreForm) -> AppResult<FormOutcome<GenreFormView>> {
        let data = match form.validate() {
            Ok(data) => data,
            Err(errors) => {
                return Ok(FormOutcome::Invalid(form_view(
                    ADD_TITLE,
                    form.clone(),
                    errors.into_vec(),
                )))
            }
        };
        if let Some(existing) = self.store.genres_find_by_name(&data.name).await? {
            tracing::debug!("Genre {:?} already exists: id={}", data.name, existing.id);
            return Ok(FormOutcome::saved(existing.url()));
        }
        let genre = self.store.genres_create(&data).await?;
        tracing::info!("Genre created: id={}", genre.id);
        Ok(FormOutcome::saved(genre.url()))
    }

    /// Renaming to a name another genre already has leaves this one as it
    /// was and resolves to the other.
    pub async fn update(
        &self,
        id: i32,
        form: &GenreForm,
    ) -> AppResult<FormOutcome<GenreFormView>> {
        self.get(id).await?;
        let data = match form.validate() {
            Ok(data) => data,
            Err(errors) => {
                return Ok(FormOutcome::Invalid(form_view(
                    UPDATE_TITLE,
                    form.clone(),
                    errors.into_vec(),
                )))
            }
        };
        if let Some(existing) = self.store.genres_find_by_name(&data.name).await? {
            return Ok(FormOutcome::saved(existing.url()));
        }
        let genre = self
            .store
            .genres_update(id, &data)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Genre, id))?;
        tracing::info!("Genre updated: id={}", id);
        Ok(FormOutcome::saved(genre.url()))
    }

    /// Refused while any book is tagged with the genre
    pub async fn delete(&self, id: i32) -> AppResult<DeleteOutcome> {
        self.get(id).await?;
        self.guard
            .delete_with(EntityKind::Genre, id, || {
                self.store.genres_delete_unreferenced(id)
            })
            .await
    }

    async fn get(&self, id: i32) -> AppResult<Genre> {
        self.store
            .genres_get(id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Genre, id))
    }
}

fn form_view(title: &str, genre: GenreForm, errors: Vec<FieldError>) -> GenreFormView {
    GenreFormView {
        title: title.to_string(),
        genre,
        errors,
    }
}
