//! Book copy (physical instance of a book) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

use super::{
    book::Book,
    catalog::{location, EntityKind},
};
use crate::validation::{FieldError, FieldErrors};

/// Circulation status of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum BookCopyStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookCopyStatus {
    pub const ALL: [BookCopyStatus; 4] = [
        BookCopyStatus::Available,
        BookCopyStatus::Maintenance,
        BookCopyStatus::Loaned,
        BookCopyStatus::Reserved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookCopyStatus::Available => "Available",
            BookCopyStatus::Maintenance => "Maintenance",
            BookCopyStatus::Loaned => "Loaned",
            BookCopyStatus::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for BookCopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown book copy status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for BookCopyStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookCopyStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Book copy record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookCopy {
    pub id: i32,
    pub book_id: i32,
    pub imprint: String,
    pub status: BookCopyStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookCopy {
    pub fn url(&self) -> String {
        location(EntityKind::BookCopy, self.id)
    }
}

// Status is stored as text
impl<'r> FromRow<'r, PgRow> for BookCopy {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            book_id: row.try_get("book_id")?,
            imprint: row.try_get("imprint")?,
            status: status.parse::<BookCopyStatus>().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            due_back: row.try_get("due_back")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCopyData {
    pub book_id: i32,
    pub imprint: String,
    pub status: BookCopyStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookCopyData {
    pub fn into_copy(self, id: i32) -> BookCopy {
        BookCopy {
            id,
            book_id: self.book_id,
            imprint: self.imprint,
            status: self.status,
            due_back: self.due_back,
        }
    }
}

/// Raw book copy form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookCopyForm {
    /// Book id
    pub book: Option<String>,
    pub imprint: Option<String>,
    /// One of Available, Maintenance, Loaned, Reserved; empty means Maintenance
    pub status: Option<String>,
    /// ISO-8601 date, may be empty
    pub due_back: Option<String>,
}

impl BookCopyForm {
    pub fn validate(&self) -> Result<BookCopyData, FieldErrors> {
        let mut errors = FieldErrors::new();

        let book_id = errors
            .check("book", self.book.as_deref())
            .required("Book not specified")
            .reference("Book reference is invalid.");
        let imprint = errors
            .check("imprint", self.imprint.as_deref())
            .required("Imprint not specified")
            .escaped();

        let raw_status = errors.check("status", self.status.as_deref()).value();
        let status = if raw_status.is_empty() {
            BookCopyStatus::default()
        } else {
            raw_status.parse::<BookCopyStatus>().unwrap_or_else(|_| {
                errors.push("status", "Status is invalid.");
                BookCopyStatus::default()
            })
        };

        let raw_due_back = self.due_back.as_deref();
        let due_back = errors.optional_date("due_back", raw_due_back, "Date is invalid");
        let due_back_given = raw_due_back.is_some_and(|v| !v.trim().is_empty());
        if status == BookCopyStatus::Loaned && !due_back_given {
            errors.push("due_back", "Due date is required for loaned copies.");
        }

        errors.into_result(BookCopyData {
            book_id: book_id.unwrap_or_default(),
            imprint,
            status,
            due_back,
        })
    }
}

impl From<&BookCopy> for BookCopyForm {
    fn from(copy: &BookCopy) -> Self {
        Self {
            book: Some(copy.book_id.to_string()),
            imprint: Some(copy.imprint.clone()),
            status: Some(copy.status.to_string()),
            due_back: copy.due_back.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// A copy together with the book it belongs to, for listing and detail pages
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookCopyEntry {
    pub copy: BookCopy,
    pub url: String,
    /// `None` when the book reference no longer resolves
    pub book: Option<Book>,
}

/// Book copy add/update form page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookCopyFormView {
    pub title: String,
    pub copy: BookCopyForm,
    /// Books sorted by title
    pub books: Vec<Book>,
    pub statuses: Vec<BookCopyStatus>,
    pub errors: Vec<FieldError>,
}
