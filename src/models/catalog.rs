//! Types shared by every catalog entity: kinds, locations, notices and
//! operation outcomes.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// The four catalog collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Author,
    Book,
    BookCopy,
    Genre,
}

impl EntityKind {
    /// Path segment used in catalog URLs
    pub fn slug(self) -> &'static str {
        match self {
            EntityKind::Author => "author",
            EntityKind::Book => "book",
            EntityKind::BookCopy => "book-copy",
            EntityKind::Genre => "genre",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Author => "Author",
            EntityKind::Book => "Book",
            EntityKind::BookCopy => "Book copy",
            EntityKind::Genre => "Genre",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "author" => Ok(EntityKind::Author),
            "book" => Ok(EntityKind::Book),
            "book-copy" => Ok(EntityKind::BookCopy),
            "genre" => Ok(EntityKind::Genre),
            other => Err(format!("unknown catalog entity: {}", other)),
        }
    }
}

/// Canonical location of a record: `/catalog/<kind>/<id>`
pub fn location(kind: EntityKind, id: i32) -> String {
    format!("/catalog/{}/{}", kind.slug(), id)
}

/// Location of the listing page for a kind
pub fn listing(kind: EntityKind) -> String {
    format!("/catalog/{}/all", kind.slug())
}

/// One-shot message shown on the next detail render of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// A delete was refused because other records still reference this one
    HasDependents,
}

impl Notice {
    pub fn as_str(self) -> &'static str {
        match self {
            Notice::HasDependents => "has_dependents",
        }
    }
}

impl FromStr for Notice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "has_dependents" => Ok(Notice::HasDependents),
            other => Err(format!("unknown notice: {}", other)),
        }
    }
}

/// Result of an add or update submission
#[derive(Debug)]
pub enum FormOutcome<V> {
    /// The record was stored (or already existed); go to its location
    Saved { location: String },
    /// Validation failed; render the form again
    Invalid(V),
}

impl<V> FormOutcome<V> {
    pub fn saved(location: impl Into<String>) -> Self {
        FormOutcome::Saved {
            location: location.into(),
        }
    }
}

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { location: String },
    /// Nothing was removed; show the record again with the notice
    Refused { location: String, notice: Notice },
}

impl DeleteOutcome {
    pub fn location(&self) -> &str {
        match self {
            DeleteOutcome::Deleted { location } | DeleteOutcome::Refused { location, .. } => {
                location
            }
        }
    }
}

/// Answer of a conditional store delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    Deleted,
    Missing,
    /// Dependents exist, the record was kept
    Referenced,
}

/// Record counts for the catalog home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogSummary {
    pub book_count: i64,
    pub book_copy_count: i64,
    pub book_copy_available_count: i64,
    pub author_count: i64,
    pub genre_count: i64,
}
