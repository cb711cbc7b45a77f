//! Genre model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{
    book::Book,
    catalog::{location, EntityKind, Notice},
};
use crate::validation::{FieldError, FieldErrors};

/// Genre record. Names are unique by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

impl Genre {
    pub fn url(&self) -> String {
        location(EntityKind::Genre, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreData {
    pub name: String,
}

/// Raw genre form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenreForm {
    pub name: Option<String>,
}

impl GenreForm {
    pub fn validate(&self) -> Result<GenreData, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors
            .check("name", self.name.as_deref())
            .min_length(3, "Genre name must contain at least 3 characters")
            .max_length(100, "Genre name must not exceed 100 characters")
            .escaped();
        errors.into_result(GenreData { name })
    }
}

impl From<&Genre> for GenreForm {
    fn from(genre: &Genre) -> Self {
        Self {
            name: Some(genre.name.clone()),
        }
    }
}

/// Genre detail page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenreDetail {
    pub genre: Genre,
    pub url: String,
    /// Books tagged with this genre
    pub books: Vec<Book>,
    pub notice: Option<Notice>,
}

/// Genre add/update form page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenreFormView {
    pub title: String,
    pub genre: GenreForm,
    pub errors: Vec<FieldError>,
}

/// A genre in the book form, with its checkbox state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GenreOption {
    pub genre: Genre,
    pub checked: bool,
}
