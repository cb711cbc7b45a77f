//! Book copy endpoints

use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use axum_extra::extract::{CookieJar, Form};

use super::delete_response;
use crate::{
    error::{AppResult, ErrorResponse},
    models::{
        book_copy::{BookCopyEntry, BookCopyFormView},
        BookCopyForm, EntityKind, FormOutcome,
    },
};

/// List all copies with their books
#[utoipa::path(
    get,
    path = "/catalog/book-copy/all",
    tag = "book-copies",
    responses(
        (status = 200, description = "Copies in insertion order", body = Vec<BookCopyEntry>)
    )
)]
pub async fn list_book_copies(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookCopyEntry>>> {
    let copies = state.services.book_copies.list().await?;
    Ok(Json(copies))
}

/// Copy details with its book
#[utoipa::path(
    get,
    path = "/catalog/book-copy/{id}",
    tag = "book-copies",
    params(
        ("id" = i32, Path, description = "Book copy ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = BookCopyEntry),
        (status = 404, description = "Copy not found", body = ErrorResponse)
    )
)]
pub async fn get_book_copy(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookCopyEntry>> {
    let copy = state.services.book_copies.find(id).await?;
    Ok(Json(copy))
}

/// Empty copy form with books and statuses to choose from
#[utoipa::path(
    get,
    path = "/catalog/book-copy/add",
    tag = "book-copies",
    responses(
        (status = 200, description = "Copy form", body = BookCopyFormView)
    )
)]
pub async fn add_book_copy_form(
    State(state): State<crate::AppState>,
) -> AppResult<Json<BookCopyFormView>> {
    let view = state.services.book_copies.show_add_form().await?;
    Ok(Json(view))
}

/// Create a copy
#[utoipa::path(
    post,
    path = "/catalog/book-copy/add",
    tag = "book-copies",
    request_body(content = BookCopyForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created, redirect to the copy"),
        (status = 422, description = "Invalid input", body = BookCopyFormView)
    )
)]
pub async fn add_book_copy(
    State(state): State<crate::AppState>,
    Form(form): Form<BookCopyForm>,
) -> AppResult<FormOutcome<BookCopyFormView>> {
    state.services.book_copies.add(&form).await
}

/// Copy form filled from the stored record
#[utoipa::path(
    get,
    path = "/catalog/book-copy/{id}/update",
    tag = "book-copies",
    params(
        ("id" = i32, Path, description = "Book copy ID")
    ),
    responses(
        (status = 200, description = "Copy form", body = BookCopyFormView),
        (status = 404, description = "Copy not found", body = ErrorResponse)
    )
)]
pub async fn update_book_copy_form(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookCopyFormView>> {
    let view = state.services.book_copies.show_update_form(id).await?;
    Ok(Json(view))
}

/// Replace a copy's fields
#[utoipa::path(
    post,
    path = "/catalog/book-copy/{id}/update",
    tag = "book-copies",
    params(
        ("id" = i32, Path, description = "Book copy ID")
    ),
    request_body(content = BookCopyForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, redirect to the copy"),
        (status = 404, description = "Copy not found", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = BookCopyFormView)
    )
)]
pub async fn update_book_copy(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Form(form): Form<BookCopyForm>,
) -> AppResult<FormOutcome<BookCopyFormView>> {
    state.services.book_copies.update(id, &form).await
}

/// Delete a copy
#[utoipa::path(
    post,
    path = "/catalog/book-copy/{id}/delete",
    tag = "book-copies",
    params(
        ("id" = i32, Path, description = "Book copy ID")
    ),
    responses(
        (status = 303, description = "Deleted, redirect to the copy's book"),
        (status = 404, description = "Copy not found", body = ErrorResponse)
    )
)]
pub async fn delete_book_copy(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> AppResult<(CookieJar, Redirect)> {
    let outcome = state.services.book_copies.delete(id).await?;
    Ok(delete_response(jar, EntityKind::BookCopy, id, outcome))
}
