use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validation::{MAX_NAME_LEN, Validate, ValidationErrors, Validator};

/// Maximum attachment size accepted for upload (25 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 25 * 1024 * 1024;

/// Metadata for a file held in object storage, owned by a document or a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Attachment {
    pub id: String,
    pub org_id: String,
    pub document_id: Option<String>,
    pub project_id: Option<String>,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    /// Object key inside the bucket.
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewAttachment {
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub storage_key: String,
}

impl Validate for NewAttachment {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("file_name", &self.file_name, MAX_NAME_LEN)
            .required("content_type", &self.content_type, 128)
            .required("storage_key", &self.storage_key, 1024);
        if self.file_name.contains('/') || self.file_name.contains('\\') {
            v.error("file_name", "must not contain path separators");
        }
        if self.document_id.is_none() && self.project_id.is_none() {
            v.error("owner", "attachment needs a document or a project");
        }
        if self.size_bytes > MAX_ATTACHMENT_BYTES {
            v.error(
                "size_bytes",
                format!("must be at most {MAX_ATTACHMENT_BYTES} bytes"),
            );
        }
        v.finish()
    }
}
