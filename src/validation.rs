//! Field-level form validation.
//!
//! Every catalog form arrives as a map of optional raw strings. Each field is
//! run through an ordered chain of rules; a failing rule records a message and
//! the chain keeps going, so a single field can collect several messages.
//! Nothing here returns an error for bad input: callers inspect the collected
//! [`FieldErrors`] and decide what to render.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidateLength;

/// A single validation failure, attached to the form field that caused it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered list of validation failures for one submitted form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Messages recorded for `field`, in rule order
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Start a rule chain on a raw field value. The value is trimmed first;
    /// an absent field behaves like an empty one.
    pub fn check<'a>(&'a mut self, field: &'static str, raw: Option<&str>) -> FieldCheck<'a> {
        FieldCheck {
            errors: self,
            field,
            value: raw.map(str::trim).unwrap_or_default().to_string(),
        }
    }

    /// Optional ISO-8601 date: empty values are skipped rather than rejected.
    pub fn optional_date(
        &mut self,
        field: &'static str,
        raw: Option<&str>,
        message: &str,
    ) -> Option<NaiveDate> {
        let value = raw.map(str::trim).filter(|v| !v.is_empty())?;
        let parsed = parse_iso_date(value);
        if parsed.is_none() {
            self.push(field, message);
        }
        parsed
    }

    /// Hand back `value` when no rule failed
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

/// Rule chain over one trimmed field value
pub struct FieldCheck<'a> {
    errors: &'a mut FieldErrors,
    field: &'static str,
    value: String,
}

impl<'a> FieldCheck<'a> {
    fn fail(&mut self, message: &str) {
        self.errors.push(self.field, message);
    }

    pub fn required(mut self, message: &str) -> Self {
        if self.value.is_empty() {
            self.fail(message);
        }
        self
    }

    /// Length counted in characters, not bytes
    pub fn min_length(mut self, min: u64, message: &str) -> Self {
        if !self.value.validate_length(Some(min), None, None) {
            self.fail(message);
        }
        self
    }

    pub fn max_length(mut self, max: u64, message: &str) -> Self {
        if !self.value.validate_length(None, Some(max), None) {
            self.fail(message);
        }
        self
    }

    /// ASCII letters and digits only; the empty string does not qualify.
    pub fn alphanumeric(mut self, message: &str) -> Self {
        if self.value.is_empty() || !self.value.chars().all(|c| c.is_ascii_alphanumeric()) {
            self.fail(message);
        }
        self
    }

    /// Parse a record reference. Empty values are left to `required`.
    pub fn reference(mut self, message: &str) -> Option<i32> {
        if self.value.is_empty() {
            return None;
        }
        match self.value.parse::<i32>() {
            Ok(id) => Some(id),
            Err(_) => {
                self.fail(message);
                None
            }
        }
    }

    /// Finish the chain with the HTML-escaped value
    pub fn escaped(self) -> String {
        escape_html(&self.value)
    }

    /// Finish the chain with the trimmed value, unescaped
    pub fn value(self) -> String {
        self.value
    }
}

/// Escape the characters that are significant in HTML markup
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339 timestamps,
/// keeping only the calendar date.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
