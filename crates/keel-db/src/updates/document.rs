//! Document update builder.

use keel_core::validation::{MAX_DOCUMENT_LEN, MAX_NAME_LEN, Validate, ValidationErrors, Validator};
use serde::Serialize;

/// A change to `title` or `body` writes a new document version; `tags` and
/// `project_id` are metadata and do not.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<String>>,
}

impl Validate for DocumentUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(title) = &self.title {
            v.required("title", title, MAX_NAME_LEN);
        }
        if let Some(body) = &self.body {
            if body.len() > MAX_DOCUMENT_LEN {
                v.error("body", format!("must be at most {MAX_DOCUMENT_LEN} bytes"));
            }
        }
        if let Some(tags) = &self.tags {
            for (i, tag) in tags.iter().enumerate() {
                v.required(&format!("tags[{i}]"), tag, 64);
            }
        }
        v.finish()
    }
}

pub struct DocumentUpdateBuilder(DocumentUpdate);

impl DocumentUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(DocumentUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.0.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.0.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn project_id(mut self, project_id: Option<String>) -> Self {
        self.0.project_id = Some(project_id);
        self
    }

    #[must_use]
    pub fn build(self) -> DocumentUpdate {
        self.0
    }
}

impl Default for DocumentUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
