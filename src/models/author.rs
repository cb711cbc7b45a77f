//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{
    book::Book,
    catalog::{location, EntityKind, Notice},
};
use crate::validation::{FieldError, FieldErrors};

const NAME_MAX_LEN: u64 = 100;

/// Author record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    pub fn url(&self) -> String {
        location(EntityKind::Author, self.id)
    }

    /// "Family, First", or empty when either part is missing
    pub fn name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            return String::new();
        }
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// Known dates as "Jan 3, 1892 - Sep 2, 1973"
    pub fn lifespan(&self) -> String {
        [self.date_of_birth, self.date_of_death]
            .into_iter()
            .flatten()
            .map(|d| d.format("%b %-d, %Y").to_string())
            .collect::<Vec<_>>()
            .join(" - ")
    }
}

/// Validated author fields, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorData {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorData {
    pub fn into_author(self, id: i32) -> Author {
        Author {
            id,
            first_name: self.first_name,
            family_name: self.family_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
        }
    }
}

/// Raw author form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthorForm {
    pub first_name: Option<String>,
    pub family_name: Option<String>,
    /// ISO-8601 date, may be empty
    pub date_of_birth: Option<String>,
    /// ISO-8601 date, may be empty
    pub date_of_death: Option<String>,
}

impl AuthorForm {
    pub fn validate(&self) -> Result<AuthorData, FieldErrors> {
        let mut errors = FieldErrors::new();

        let first_name = errors
            .check("first_name", self.first_name.as_deref())
            .required("First name must be specified.")
            .max_length(NAME_MAX_LEN, "First name must not exceed 100 characters.")
            .alphanumeric("First name has non-alphanumeric characters.")
            .escaped();
        let family_name = errors
            .check("family_name", self.family_name.as_deref())
            .required("Family name must be specified.")
            .max_length(NAME_MAX_LEN, "Family name must not exceed 100 characters.")
            .alphanumeric("Family name has non-alphanumeric characters.")
            .escaped();
        let date_of_birth = errors.optional_date(
            "date_of_birth",
            self.date_of_birth.as_deref(),
            "Invalid date of birth",
        );
        let date_of_death = errors.optional_date(
            "date_of_death",
            self.date_of_death.as_deref(),
            "Invalid date of death",
        );

        errors.into_result(AuthorData {
            first_name,
            family_name,
            date_of_birth,
            date_of_death,
        })
    }
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        Self {
            first_name: Some(author.first_name.clone()),
            family_name: Some(author.family_name.clone()),
            date_of_birth: author.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
            date_of_death: author.date_of_death.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Author detail page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetail {
    pub author: Author,
    pub name: String,
    pub lifespan: String,
    pub url: String,
    /// Books written by this author
    pub books: Vec<Book>,
    pub notice: Option<Notice>,
}

/// Author add/update form page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorFormView {
    pub title: String,
    pub author: AuthorForm,
    pub errors: Vec<FieldError>,
}
