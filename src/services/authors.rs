//! Author pages: listing, detail, forms and writes

use std::sync::Arc;

use super::integrity::IntegrityGuard;
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{AuthorDetail, AuthorFormView},
        Author, AuthorForm, DeleteOutcome, EntityKind, FormOutcome, Notice,
    },
    repository::CatalogStore,
    validation::FieldError,
};

const ADD_TITLE: &str = "Add author entry";
const UPDATE_TITLE: &str = "Update author entry";

#[derive(Clone)]
pub struct AuthorsService {
    store: Arc<dyn CatalogStore>,
    guard: IntegrityGuard,
}

impl AuthorsService {
    pub fn new(store: Arc<dyn CatalogStore>, guard: IntegrityGuard) -> Self {
        Self { store, guard }
    }

    /// All authors ordered by family name
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        self.store.authors_list().await
    }

    /// Author with their books
    pub async fn find(&self, id: i32, notice: Option<Notice>) -> AppResult<AuthorDetail> {
        let author = self.get(id).await?;
        let books = self.store.books_by_author(id).await?;
        Ok(AuthorDetail {
            name: author.name(),
            lifespan: author.lifespan(),
            url: author.url(),
            books,
            notice,
            author,
        })
    }

    pub fn show_add_form(&self) -> AuthorFormView {
        form_view(ADD_TITLE, AuthorForm::default(), Vec::new())
    }

    pub async fn show_update_form(&self, id: i32) -> AppResult<AuthorFormView> {
        let author = self.get(id).await?;
        Ok(form_view(UPDATE_TITLE, AuthorForm::from(&author), Vec::new()))
    }

    pub async fn add(&self, form: &AuthorForm) -> AppResult<FormOutcome<AuthorFormView>> {
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
        let author = self.store.authors_create(&data).await?;
        tracing::info!("Author created: id={}", author.id);
        Ok(FormOutcome::saved(author.url()))
    }

    pub async fn update(
        &self,
        id: i32,
        form: &AuthorForm,
    ) -> AppResult<FormOutcome<AuthorFormView>> {
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
        let author = self
            .store
            .authors_update(id, &data)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Author, id))?;
        tracing::info!("Author updated: id={}", id);
        Ok(FormOutcome::saved(author.url()))
    }

    /// Refused while any book still names this author
    pub async fn delete(&self, id: i32) -> AppResult<DeleteOutcome> {
        self.get(id).await?;
        self.guard
            .delete_with(EntityKind::Author, id, || {
                self.store.authors_delete_unreferenced(id)
            })
            .await
    }

    async fn get(&self, id: i32) -> AppResult<Author> {
        self.store
            .authors_get(id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Author, id))
    }
}

fn form_view(
    title: &str,
    author: AuthorForm,
    errors: Vec<FieldError>,
) -> AuthorFormView {
    AuthorFormView {
        title: title.to_string(),
        author,
        errors,
    }
}
