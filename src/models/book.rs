//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{
    author::Author,
    book_copy::BookCopy,
    catalog::{location, EntityKind, Notice},
    genre::{Genre, GenreOption},
};
use crate::validation::{FieldError, FieldErrors};

/// Book record. `author_id` and `genre_ids` are plain references and are
/// not checked on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<i32>,
}

impl Book {
    pub fn url(&self) -> String {
        location(EntityKind::Book, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookData {
    pub title: String,
    pub author_id: i32,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<i32>,
}

impl BookData {
    pub fn into_book(self, id: i32) -> Book {
        Book {
            id,
            title: self.title,
            author_id: self.author_id,
            summary: self.summary,
            isbn: self.isbn,
            genre_ids: self.genre_ids,
        }
    }
}

/// Raw book form submission. `genre` is repeated once per checked genre.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookForm {
    pub title: Option<String>,
    /// Author id
    pub author: Option<String>,
    pub summary: Option<String>,
    pub isbn: Option<String>,
    /// Genre ids
    #[serde(default)]
    pub genre: Vec<String>,
}

impl BookForm {
    pub fn validate(&self) -> Result<BookData, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = errors
            .check("title", self.title.as_deref())
            .required("Title must not be empty.")
            .escaped();
        let author_id = errors
            .check("author", self.author.as_deref())
            .required("Author must not be empty.")
            .reference("Author reference is invalid.");
        let summary = errors
            .check("summary", self.summary.as_deref())
            .required("Summary must not be empty.")
            .escaped();
        let isbn = errors
            .check("isbn", self.isbn.as_deref())
            .required("ISBN must not be empty")
            .escaped();

        let mut genre_ids = Vec::with_capacity(self.genre.len());
        for raw in &self.genre {
            if let Some(id) = errors
                .check("genre", Some(raw.as_str()))
                .reference("Genre reference is invalid.")
            {
                if !genre_ids.contains(&id) {
                    genre_ids.push(id);
                }
            }
        }

        errors.into_result(BookData {
            title,
            author_id: author_id.unwrap_or_default(),
            summary,
            isbn,
            genre_ids,
        })
    }

    /// Genre ids the submission asks for, ignoring anything unparsable
    pub fn selected_genres(&self) -> Vec<i32> {
        self.genre
            .iter()
            .filter_map(|g| g.trim().parse().ok())
            .collect()
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: Some(book.title.clone()),
            author: Some(book.author_id.to_string()),
            summary: Some(book.summary.clone()),
            isbn: Some(book.isbn.clone()),
            genre: book.genre_ids.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// Row of the book listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookListEntry {
    pub book: Book,
    pub url: String,
    /// `None` when the author reference no longer resolves
    pub author: Option<Author>,
}

/// Book detail page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub url: String,
    /// `None` when the author reference no longer resolves
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub copies: Vec<BookCopy>,
    pub notice: Option<Notice>,
}

/// Book add/update form page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookFormView {
    pub title: String,
    pub book: BookForm,
    /// Authors sorted by family name
    pub authors: Vec<Author>,
    /// Genres sorted by name, checked when selected on the book
    pub genres: Vec<GenreOption>,
    pub errors: Vec<FieldError>,
}
