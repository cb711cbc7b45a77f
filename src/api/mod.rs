//! HTTP handlers for the `/catalog` pages
//!
//! Pages are JSON view models. Writes take urlencoded form bodies and answer
//! with a 303 redirect, or 422 and the form view when validation fails.

pub mod authors;
pub mod book_copies;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;
pub mod openapi;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

use crate::{
    models::{DeleteOutcome, EntityKind, FormOutcome, Notice},
    AppState,
};

/// Cookie carrying a pending one-shot notice as `<kind>:<id>:<notice>`
pub const NOTICE_COOKIE: &str = "catalog_notice";

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        // Catalog home
        .route("/catalog", get(catalog::get_summary))
        // Authors
        .route("/catalog/author/all", get(authors::list_authors))
        .route(
            "/catalog/author/add",
            get(authors::add_author_form).post(authors::add_author),
        )
        .route("/catalog/author/:id", get(authors::get_author))
        .route(
            "/catalog/author/:id/update",
            get(authors::update_author_form).post(authors::update_author),
        )
        .route("/catalog/author/:id/delete", post(authors::delete_author))
        // Books
        .route("/catalog/book/all", get(books::list_books))
        .route(
            "/catalog/book/add",
            get(books::add_book_form).post(books::add_book),
        )
        .route("/catalog/book/:id", get(books::get_book))
        .route(
            "/catalog/book/:id/update",
            get(books::update_book_form).post(books::update_book),
        )
        .route("/catalog/book/:id/delete", post(books::delete_book))
        // Book copies
        .route("/catalog/book-copy/all", get(book_copies::list_book_copies))
        .route(
            "/catalog/book-copy/add",
            get(book_copies::add_book_copy_form).post(book_copies::add_book_copy),
        )
        .route("/catalog/book-copy/:id", get(book_copies::get_book_copy))
        .route(
            "/catalog/book-copy/:id/update",
            get(book_copies::update_book_copy_form).post(book_copies::update_book_copy),
        )
        .route(
            "/catalog/book-copy/:id/delete",
            post(book_copies::delete_book_copy),
        )
        // Genres
        .route("/catalog/genre/all", get(genres::list_genres))
        .route(
            "/catalog/genre/add",
            get(genres::add_genre_form).post(genres::add_genre),
        )
        .route("/catalog/genre/:id", get(genres::get_genre))
        .route(
            "/catalog/genre/:id/update",
            get(genres::update_genre_form).post(genres::update_genre),
        )
        .route("/catalog/genre/:id/delete", post(genres::delete_genre))
        .with_state(state)
}

impl<V: Serialize> IntoResponse for FormOutcome<V> {
    fn into_response(self) -> Response {
        match self {
            FormOutcome::Saved { location } => Redirect::to(&location).into_response(),
            FormOutcome::Invalid(view) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response()
            }
        }
    }
}

fn notice_cookie(kind: EntityKind, id: i32, notice: Notice) -> Cookie<'static> {
    Cookie::build((
        NOTICE_COOKIE,
        format!("{}:{}:{}", kind.slug(), id, notice.as_str()),
    ))
    .path("/catalog")
    .http_only(true)
    .same_site(SameSite::Lax)
    .build()
}

fn clear_notice(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(NOTICE_COOKIE).path("/catalog"))
}

/// Take the pending notice if it belongs to `kind`/`id`. The returned jar
/// drops the cookie so the notice is shown once.
pub fn take_notice(jar: CookieJar, kind: EntityKind, id: i32) -> (CookieJar, Option<Notice>) {
    let notice = jar
        .get(NOTICE_COOKIE)
        .and_then(|cookie| parse_notice(cookie.value(), kind, id));
    match notice {
        Some(notice) => (clear_notice(jar), Some(notice)),
        None => (jar, None),
    }
}

fn parse_notice(value: &str, kind: EntityKind, id: i32) -> Option<Notice> {
    let mut parts = value.splitn(3, ':');
    let slug = parts.next()?;
    let record = parts.next()?.parse::<i32>().ok()?;
    if slug != kind.slug() || record != id {
        return None;
    }
    parts.next()?.parse().ok()
}

/// Redirect for a delete; a refusal leaves a notice for the record's next
/// detail render.
pub fn delete_response(
    jar: CookieJar,
    kind: EntityKind,
    id: i32,
    outcome: DeleteOutcome,
) -> (CookieJar, Redirect) {
    match outcome {
        DeleteOutcome::Deleted { location } => (clear_notice(jar), Redirect::to(&location)),
        DeleteOutcome::Refused { location, notice } => (
            jar.add(notice_cookie(kind, id, notice)),
            Redirect::to(&location),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{repository::memory::MemoryStore, services::Services};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState {
            services: Arc::new(Services::new(MemoryStore::new())),
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn location(response: &Response) -> String {
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    /// `name=value` of the first Set-Cookie header
    fn set_cookie(response: &Response) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string())
    }

    async fn json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_parse_notice_is_scoped_to_record() {
        assert_eq!(
            parse_notice("author:3:has_dependents", EntityKind::Author, 3),
            Some(Notice::HasDependents)
        );
        assert_eq!(parse_notice("author:3:has_dependents", EntityKind::Author, 4), None);
        assert_eq!(parse_notice("genre:3:has_dependents", EntityKind::Author, 3), None);
        assert_eq!(parse_notice("author:x:has_dependents", EntityKind::Author, 3), None);
        assert_eq!(parse_notice("garbage", EntityKind::Author, 3), None);
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let response = send(&app, get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&app, get("/ready")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let response = send(&app(), get("/api-docs/openapi.json")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let doc = json(response).await;
        assert!(doc["paths"]["/catalog/author/{id}"].is_object());
    }

    #[tokio::test]
    async fn test_add_author_redirects_to_detail() {
        let app = app();
        let response = send(
            &app,
            post_form("/catalog/author/add", "first_name=Jane&family_name=Austen"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let detail = location(&response);
        assert!(detail.starts_with("/catalog/author/"));

        let response = send(&app, get(&detail)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["name"], "Austen, Jane");
        assert!(body["notice"].is_null());
    }

    #[tokio::test]
    async fn test_invalid_form_is_unprocessable() {
        let response = send(&app(), post_form("/catalog/genre/add", "name=ab")).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json(response).await;
        assert_eq!(body["genre"]["name"], "ab");
        assert_eq!(
            body["errors"][0]["message"],
            "Genre name must contain at least 3 characters"
        );
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let app = app();
        for uri in [
            "/catalog/author/42",
            "/catalog/book/42/update",
            "/catalog/book-copy/42",
            "/catalog/genre/42",
        ] {
            let response = send(&app, get(uri)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
        let response = send(&app, post_form("/catalog/genre/42/delete", "")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_book_with_repeated_genre_keys() {
        let app = app();
        let first = send(&app, post_form("/catalog/genre/add", "name=Drama")).await;
        let second = send(&app, post_form("/catalog/genre/add", "name=Comedy")).await;
        let drama = location(&first).rsplit('/').next().unwrap().to_string();
        let comedy = location(&second).rsplit('/').next().unwrap().to_string();

        let body = format!(
            "title=Twelfth+Night&author=1&summary=Shipwreck&isbn=123&genre={}&genre={}",
            drama, comedy
        );
        let response = send(&app, post_form("/catalog/book/add", &body)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let detail = json(send(&app, get(&location(&response))).await).await;
        assert_eq!(detail["genres"].as_array().unwrap().len(), 2);
        assert!(detail["author"].is_null());
    }

    /// Decoded `(name, value)` of a `name=value` cookie pair
    fn decoded(cookie: &str) -> (String, String) {
        let cookie = Cookie::parse_encoded(cookie.to_string()).unwrap();
        (cookie.name().to_string(), cookie.value().to_string())
    }

    /// Refused delete of `record`: checks the redirect and the notice cookie,
    /// then that the record's next detail render shows the notice once.
    async fn assert_notice_shown_once(app: &Router, record: &str, slug: &str) {
        let id = record.rsplit('/').next().unwrap();
        let response = send(app, post_form(&format!("{}/delete", record), "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), record);
        let cookie = set_cookie(&response).unwrap();
        assert_eq!(
            decoded(&cookie),
            (
                NOTICE_COOKIE.to_string(),
                format!("{}:{}:has_dependents", slug, id)
            )
        );

        // Another page does not consume the notice
        let response = send(app, get_with_cookie("/catalog/genre/all", &cookie)).await;
        assert!(set_cookie(&response).is_none());

        let response = send(app, get_with_cookie(record, &cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let removal = set_cookie(&response).unwrap();
        assert_eq!(removal, format!("{}=", NOTICE_COOKIE));
        assert_eq!(json(response).await["notice"], "has_dependents");

        // The browser dropped the cookie; the next render has no notice
        let response = send(app, get(record)).await;
        assert!(json(response).await["notice"].is_null());
    }

    #[tokio::test]
    async fn test_refused_author_delete_sets_notice_once() {
        let app = app();
        let response = send(
            &app,
            post_form("/catalog/author/add", "first_name=Jane&family_name=Austen"),
        )
        .await;
        let author = location(&response);
        let author_id = author.rsplit('/').next().unwrap().to_string();
        let body = format!("title=Emma&author={}&summary=Matchmaking&isbn=1", author_id);
        send(&app, post_form("/catalog/book/add", &body)).await;

        assert_notice_shown_once(&app, &author, "author").await;
    }

    #[tokio::test]
    async fn test_refused_book_delete_sets_notice_once() {
        let app = app();
        let response = send(
            &app,
            post_form("/catalog/book/add", "title=Emma&author=1&summary=s&isbn=1"),
        )
        .await;
        let book = location(&response);
        let book_id = book.rsplit('/').next().unwrap().to_string();
        send(
            &app,
            post_form(
                "/catalog/book-copy/add",
                &format!("book={}&imprint=Penguin&status=Available", book_id),
            ),
        )
        .await;

        assert_notice_shown_once(&app, &book, "book").await;
    }

    #[tokio::test]
    async fn test_refused_genre_delete_sets_notice_once() {
        let app = app();
        let response = send(&app, post_form("/catalog/genre/add", "name=Gothic")).await;
        let genre = location(&response);
        let genre_id = genre.rsplit('/').next().unwrap().to_string();
        let body = format!(
            "title=Dracula&author=1&summary=Count&isbn=1&genre={}",
            genre_id
        );
        send(&app, post_form("/catalog/book/add", &body)).await;

        assert_notice_shown_once(&app, &genre, "genre").await;
    }

    #[tokio::test]
    async fn test_notice_for_one_record_is_kept_by_another() {
        let app = app();
        let response = send(&app, post_form("/catalog/genre/add", "name=Gothic")).await;
        let genre = location(&response);
        let genre_id = genre.rsplit('/').next().unwrap().to_string();
        let other = location(&send(&app, post_form("/catalog/genre/add", "name=Satire")).await);
        let body = format!("title=Dracula&author=1&summary=Count&isbn=1&genre={}", genre_id);
        send(&app, post_form("/catalog/book/add", &body)).await;

        let response = send(&app, post_form(&format!("{}/delete", genre), "")).await;
        let cookie = set_cookie(&response).unwrap();

        let response = send(&app, get_with_cookie(&other, &cookie)).await;
        assert!(set_cookie(&response).is_none());
        assert!(json(response).await["notice"].is_null());
    }

    #[tokio::test]
    async fn test_delete_book_copy_redirects_to_book() {
        let app = app();
        let response = send(
            &app,
            post_form("/catalog/book/add", "title=Emma&author=1&summary=s&isbn=1"),
        )
        .await;
        let book = location(&response);
        let book_id = book.rsplit('/').next().unwrap().to_string();

        let response = send(
            &app,
            post_form(
                "/catalog/book-copy/add",
                &format!("book={}&imprint=Penguin&status=Available", book_id),
            ),
        )
        .await;
        let copy = location(&response);

        let response = send(&app, post_form(&format!("{}/delete", copy), "")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), book);

        let detail = json(send(&app, get(&book)).await).await;
        assert!(detail["copies"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary() {
        let app = app();
        send(&app, post_form("/catalog/genre/add", "name=Poetry")).await;
        let body = json(send(&app, get("/catalog")).await).await;
        assert_eq!(body["genre_count"], 1);
        assert_eq!(body["book_count"], 0);
    }
}
