//! Attachment object storage configuration.

use serde::{Deserialize, Serialize};

const fn default_signed_url_ttl_secs() -> u64 {
    3600
}

fn default_local_dir() -> String {
    String::from(".keel/attachments")
}

/// S3-compatible bucket (AWS, R2, MinIO) or a local directory fallback.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default)]
    pub bucket: String,

    /// Custom endpoint for S3-compatible services. Empty means AWS.
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,

    /// Used when no bucket is configured.
    #[serde(default = "default_local_dir")]
    pub local_dir: String,

    /// Lifetime of signed download URLs.
    #[serde(default = "default_signed_url_ttl_secs")]
    pub signed_url_ttl_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            endpoint: String::new(),
            region: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            local_dir: default_local_dir(),
            signed_url_ttl_secs: default_signed_url_ttl_secs(),
        }
    }
}

impl StorageConfig {
    /// Bucket name and credentials are all present.
    #[must_use]
    pub fn is_s3_configured(&self) -> bool {
        !self.bucket.is_empty()
            && !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
    }

    /// Region to sign with. S3-compatible services ignore it but the signer needs one.
    #[must_use]
    pub fn region_or_default(&self) -> &str {
        if self.region.is_empty() {
            "auto"
        } else {
            &self.region
        }
    }
}
