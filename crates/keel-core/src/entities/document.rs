use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validation::{
    MAX_DOCUMENT_LEN, MAX_NAME_LEN, Validate, ValidationErrors, Validator, slugify,
};

/// A markdown knowledge-base page. `version` is the number of the latest
/// `DocumentVersion`; every title or body change writes a new version.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub org_id: String,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub project_id: Option<String>,
    pub tags: Vec<String>,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An immutable snapshot of a document's title and body.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DocumentVersion {
    pub id: String,
    pub document_id: String,
    pub version: u32,
    pub title: String,
    pub body: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewDocument {
    pub title: String,
    /// Derived from the title when unset.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewDocument {
    /// The explicit slug, or one derived from the title.
    #[must_use]
    pub fn effective_slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.title))
    }
}

impl Validate for NewDocument {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("title", &self.title, MAX_NAME_LEN);
        if !self.title.trim().is_empty() {
            v.slug("slug", &self.effective_slug());
        }
        if self.body.len() > MAX_DOCUMENT_LEN {
            v.error("body", format!("must be at most {MAX_DOCUMENT_LEN} bytes"));
        }
        for (i, tag) in self.tags.iter().enumerate() {
            v.required(&format!("tags[{i}]"), tag, 64);
        }
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_defaults_from_title() {
        let input = NewDocument {
            title: "Onboarding Guide".into(),
            ..NewDocument::default()
        };
        assert_eq!(input.effective_slug(), "onboarding-guide");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn explicit_bad_slug_is_rejected() {
        let input = NewDocument {
            title: "Guide".into(),
            slug: Some("Bad Slug".into()),
            ..NewDocument::default()
        };
        assert!(input.validate().unwrap_err().has("slug"));
    }

    #[test]
    fn title_without_alphanumerics_has_no_slug() {
        let input = NewDocument {
            title: "!!!".into(),
            ..NewDocument::default()
        };
        assert!(input.validate().unwrap_err().has("slug"));
    }
}
