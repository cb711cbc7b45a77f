//! OpenAPI documentation

use axum::Json;
use utoipa::OpenApi;

use crate::api::{authors, book_copies, books, catalog, genres, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LocalLibrary Catalog API",
        version = "0.1.0",
        description = "Catalog pages for a library's authors, books, book copies and genres"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::get_summary,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::add_author_form,
        authors::add_author,
        authors::update_author_form,
        authors::update_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::add_book_form,
        books::add_book,
        books::update_book_form,
        books::update_book,
        books::delete_book,
        // Book copies
        book_copies::list_book_copies,
        book_copies::get_book_copy,
        book_copies::add_book_copy_form,
        book_copies::add_book_copy,
        book_copies::update_book_copy_form,
        book_copies::update_book_copy,
        book_copies::delete_book_copy,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::add_genre_form,
        genres::add_genre,
        genres::update_genre_form,
        genres::update_genre,
        genres::delete_genre,
    ),
    components(
        schemas(
            // Catalog
            crate::models::catalog::CatalogSummary,
            crate::models::catalog::Notice,
            crate::models::catalog::EntityKind,
            // Authors
            crate::models::author::Author,
            crate::models::author::AuthorForm,
            crate::models::author::AuthorDetail,
            crate::models::author::AuthorFormView,
            // Books
            crate::models::book::Book,
            crate::models::book::BookForm,
            crate::models::book::BookListEntry,
            crate::models::book::BookDetail,
            crate::models::book::BookFormView,
            // Book copies
            crate::models::book_copy::BookCopy,
            crate::models::book_copy::BookCopyStatus,
            crate::models::book_copy::BookCopyForm,
            crate::models::book_copy::BookCopyEntry,
            crate::models::book_copy::BookCopyFormView,
            // Genres
            crate::models::genre::Genre,
            crate::models::genre::GenreForm,
            crate::models::genre::GenreDetail,
            crate::models::genre::GenreFormView,
            crate::models::genre::GenreOption,
            // Validation
            crate::validation::FieldError,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Catalog home"),
        (name = "authors", description = "Author pages"),
        (name = "books", description = "Book pages"),
        (name = "book-copies", description = "Book copy pages"),
        (name = "genres", description = "Genre pages")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
