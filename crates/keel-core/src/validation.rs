//! Field validation for every input payload written to the database.
//!
//! Each `New*` input and update payload implements [`Validate`]. Validation
//! collects every failing field rather than stopping at the first, so a form
//! can show all problems at once. The `Display` output is one human-readable
//! sentence per field, joined with `; `.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Maximum length for short text fields (names, titles, companies).
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length for long text fields (descriptions, notes, comments).
pub const MAX_TEXT_LEN: usize = 10_000;

/// Maximum size of a markdown document body, in bytes.
pub const MAX_DOCUMENT_LEN: usize = 1_000_000;

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All failing fields of one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// A single-field error, for checks made outside a [`Validator`].
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    /// Whether `field` has at least one error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect();
        write!(f, "Invalid input: {}", parts.join("; "))
    }
}

/// Implemented by every payload that is validated before a write.
pub trait Validate {
    /// # Errors
    ///
    /// Returns `ValidationErrors` listing every failing field.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Accumulates field errors.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
        self
    }

    /// Non-blank and at most `max` characters.
    pub fn required(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.error(field, "is required");
        } else if value.chars().count() > max {
            self.error(field, format!("must be at most {max} characters"));
        }
        self
    }

    /// At most `max` characters when present. Blank strings are allowed.
    pub fn optional(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.error(field, format!("must be at most {max} characters"));
            }
        }
        self
    }

    /// Finite and within `[min, max]`.
    pub fn range(&mut self, field: &str, value: f64, min: f64, max: f64) -> &mut Self {
        if !value.is_finite() || value < min || value > max {
            self.error(field, format!("must be between {min} and {max}"));
        }
        self
    }

    /// Percentages and scores: `0..=100`.
    pub fn percentage(&mut self, field: &str, value: f64) -> &mut Self {
        self.range(field, value, 0.0, 100.0)
    }

    /// Money and other amounts that cannot go below zero.
    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() || value < 0.0 {
            self.error(field, "must be zero or greater");
        }
        self
    }

    /// Likert answers: `1..=5`.
    pub fn likert(&mut self, field: &str, value: u8) -> &mut Self {
        if !(1..=5).contains(&value) {
            self.error(field, "must be between 1 and 5");
        }
        self
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            if !is_email(value) {
                self.error(field, "must be a valid e-mail address");
            }
        }
        self
    }

    pub fn slug(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_slug(value) {
            self.error(
                field,
                "must contain only lowercase letters, digits, and single dashes",
            );
        }
        self
    }

    /// `end` must not be before `start` when both are set.
    pub fn date_order(
        &mut self,
        field: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> &mut Self {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                self.error(field, "must not be before the start date");
            }
        }
        self
    }

    /// # Errors
    ///
    /// Returns the accumulated errors if any check failed.
    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: std::mem::take(&mut self.errors),
            })
        }
    }
}

/// `local@domain.tld` with no whitespace.
#[must_use]
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let mut labels = domain.split('.');
    let has_dot = domain.contains('.');
    has_dot && labels.all(|label| !label.is_empty())
}

/// Lowercase ASCII letters and digits separated by single dashes.
#[must_use]
pub fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Derive a slug from free text: lowercase, non-alphanumerics collapsed to dashes.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
