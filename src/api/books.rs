//! Book endpoints

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
        book::{BookDetail, BookFormView, BookListEntry},
        BookForm, EntityKind, FormOutcome,
    },
};

/// List all books with their authors
#[utoipa::path(
    get,
    path = "/catalog/book/all",
    tag = "books",
    responses(
        (status = 200, description = "Books ordered by title", body = Vec<BookListEntry>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookListEntry>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Book details with author, genres and copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> AppResult<(CookieJar, Json<BookDetail>)> {
    let (jar, notice) = take_notice(jar, EntityKind::Book, id);
    let detail = state.services.books.find(id, notice).await?;
    Ok((jar, Json(detail)))
}

/// Empty book form with authors and genres to choose from
#[utoipa::path(
    get,
    path = "/catalog/book/add",
    tag = "books",
    responses(
        (status = 200, description = "Book form", body = BookFormView)
    )
)]
pub async fn add_book_form(State(state): State<crate::AppState>) -> AppResult<Json<BookFormView>> {
    let view = state.services.books.show_add_form().await?;
    Ok(Json(view))
}

/// Create a book. Genres are sent as repeated `genre` fields.
#[utoipa::path(
    post,
    path = "/catalog/book/add",
    tag = "books",
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created, redirect to the book"),
        (status = 422, description = "Invalid input", body = BookFormView)
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    Form(form): Form<BookForm>,
) -> AppResult<FormOutcome<BookFormView>> {
    state.services.books.add(&form).await
}

/// Book form filled from the stored record
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/update",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book form", body = BookFormView),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book_form(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookFormView>> {
    let view = state.services.books.show_update_form(id).await?;
    Ok(Json(view))
}

/// Replace a book's fields
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/update",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, redirect to the book"),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = BookFormView)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Form(form): Form<BookForm>,
) -> AppResult<FormOutcome<BookFormView>> {
    state.services.books.update(id, &form).await
}

/// Delete a book that has no copies
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/delete",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Deleted, redirect to the book list; refused, redirect to the book with a notice"),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> AppResult<(CookieJar, Redirect)> {
    let outcome = state.services.books.delete(id).await?;
    Ok(delete_response(jar, EntityKind::Book, id, outcome))
}
