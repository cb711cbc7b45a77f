//! Genre endpoints

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
        genre::{GenreDetail, GenreFormView},
        EntityKind, FormOutcome, Genre, GenreForm,
    },
};

/// List all genres
#[utoipa::path(
    get,
    path = "/catalog/genre/all",
    tag = "genres",
    responses(
        (status = 200, description = "Genres ordered by name", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.genres.list().await?;
    Ok(Json(genres))
}

/// Genre details with its books
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}",
    tag = "genres",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre details", body = GenreDetail),
        (status = 404, description = "Genre not found", body = ErrorResponse)
    )
)]
pub async fn get_genre(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> AppResult<(CookieJar, Json<GenreDetail>)> {
    let (jar, notice) = take_notice(jar, EntityKind::Genre, id);
    let detail = state.services.genres.find(id, notice).await?;
    Ok((jar, Json(detail)))
}

/// Empty genre form
#[utoipa::path(
    get,
    path = "/catalog/genre/add",
    tag = "genres",
    responses(
        (status = 200, description = "Genre form", body = GenreFormView)
    )
)]
pub async fn add_genre_form(State(state): State<crate::AppState>) -> Json<GenreFormView> {
    Json(state.services.genres.show_add_form())
}

/// Create a genre, or find the one that already has this name
#[utoipa::path(
    post,
    path = "/catalog/genre/add",
    tag = "genres",
    request_body(content = GenreForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created or already present, redirect to the genre"),
        (status = 422, description = "Invalid input", body = GenreFormView)
    )
)]
pub async fn add_genre(
    State(state): State<crate::AppState>,
    Form(form): Form<GenreForm>,
) -> AppResult<FormOutcome<GenreFormView>> {
    state.services.genres.add(&form).await
}

/// Genre form filled from the stored record
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}/update",
    tag = "genres",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre form", body = GenreFormView),
        (status = 404, description = "Genre not found", body = ErrorResponse)
    )
)]
pub async fn update_genre_form(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<GenreFormView>> {
    let view = state.services.genres.show_update_form(id).await?;
    Ok(Json(view))
}

/// Rename a genre
#[utoipa::path(
    post,
    path = "/catalog/genre/{id}/update",
    tag = "genres",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    request_body(content = GenreForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, redirect to the genre holding the name"),
        (status = 404, description = "Genre not found", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = GenreFormView)
    )
)]
pub async fn update_genre(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Form(form): Form<GenreForm>,
) -> AppResult<FormOutcome<GenreFormView>> {
    state.services.genres.update(id, &form).await
}

/// Delete a genre no book is tagged with
#[utoipa::path(
    post,
    path = "/catalog/genre/{id}/delete",
    tag = "genres",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    responses(
        (status = 303, description = "Deleted, redirect to the genre list; refused, redirect to the genre with a notice"),
        (status = 404, description = "Genre not found", body = ErrorResponse)
    )
)]
pub async fn delete_genre(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> AppResult<(CookieJar, Redirect)> {
    let outcome = state.services.genres.delete(id).await?;
    Ok(delete_response(jar, EntityKind::Genre, id, outcome))
}
