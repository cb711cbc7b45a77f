//! Author endpoints

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use axum_extra::extract::{CookieJar, Form};

use super::{delete_response, take_notice};
use crate::{
    error::{AppResult, ErrorResponse},
    models::{
        author::{AuthorDetail, AuthorFormView},
        Author, AuthorForm, EntityKind, FormOutcome,
    },
};

/// List all authors
#[utoipa::path(
    get,
    path = "/catalog/author/all",
    tag = "authors",
    responses(
        (status = 200, description = "Authors ordered by family name", body = Vec<Author>)
    )
)]
pub async fn list_authors(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.authors.list().await?;
    Ok(Json(authors))
}

/// Author details with their books
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> AppResult<(CookieJar, Json<AuthorDetail>)> {
    let (jar, notice) = take_notice(jar, EntityKind::Author, id);
    let detail = state.services.authors.find(id, notice).await?;
    Ok((jar, Json(detail)))
}

/// Empty author form
#[utoipa::path(
    get,
    path = "/catalog/author/add",
    tag = "authors",
    responses(
        (status = 200, description = "Author form", body = AuthorFormView)
    )
)]
pub async fn add_author_form(State(state): State<crate::AppState>) -> Json<AuthorFormView> {
    Json(state.services.authors.show_add_form())
}

/// Create an author
#[utoipa::path(
    post,
    path = "/catalog/author/add",
    tag = "authors",
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created, redirect to the author"),
        (status = 422, description = "Invalid input", body = AuthorFormView)
    )
)]
pub async fn add_author(
    State(state): State<crate::AppState>,
    Form(form): Form<AuthorForm>,
) -> AppResult<FormOutcome<AuthorFormView>> {
    state.services.authors.add(&form).await
}

/// Author form filled from the stored record
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author form", body = AuthorFormView),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
pub async fn update_author_form(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorFormView>> {
    let view = state.services.authors.show_update_form(id).await?;
    Ok(Json(view))
}

/// Replace an author's fields
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, redirect to the author"),
        (status = 404, description = "Author not found", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = AuthorFormView)
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Form(form): Form<AuthorForm>,
) -> AppResult<FormOutcome<AuthorFormView>> {
    state.services.authors.update(id, &form).await
}

/// Delete an author that has no books
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 303, description = "Deleted, redirect to the author list; refused, redirect to the author with a notice"),
        (status = 404, description = "Author not found", body = ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> AppResult<(CookieJar, Redirect)> {
    let outcome = state.services.authors.delete(id).await?;
    Ok(delete_response(jar, EntityKind::Author, id, outcome))
}
