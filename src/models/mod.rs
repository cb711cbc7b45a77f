//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_copy;
pub mod catalog;
pub mod genre;

// Re-export commonly used types
pub use author::{Author, AuthorData, AuthorForm};
pub use book::{Book, BookData, BookForm};
pub use book_copy::{BookCopy, BookCopyData, BookCopyForm, BookCopyStatus};
pub use catalog::{DeleteOutcome, DeleteStatus, EntityKind, FormOutcome, Notice};
pub use genre::{Genre, GenreData, GenreForm};
