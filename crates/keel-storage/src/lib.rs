//! # keel-storage
//!
//! Object storage for attachment bytes. Metadata lives in `keel-db`; this
//! crate only moves bytes and hands out download links.
//!
//! The backend is an S3-compatible bucket (AWS, Cloudflare R2, `MinIO`) when
//! `[storage]` carries a bucket and credentials, and a local directory
//! otherwise. Both sit behind `object_store`, so callers see one API.

mod error;
mod key;

pub use error::StorageError;
pub use key::{KeyScope, attachment_key, sanitize_segment};

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use keel_config::StorageConfig;
use keel_core::entities::MAX_ATTACHMENT_BYTES;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore, PutOptions, PutPayload};

enum Backend {
    S3(Arc<AmazonS3>),
    Local {
        store: Arc<LocalFileSystem>,
        root: PathBuf,
    },
}

/// Attachment bytes store.
pub struct AttachmentStore {
    backend: Backend,
    url_ttl: Duration,
}

impl AttachmentStore {
    /// Build the store described by `config`. A relative `local_dir` is
    /// resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if the S3 client cannot be built, or
    /// `Io` if the local directory cannot be created.
    pub fn from_config(config: &StorageConfig, base_dir: &FsPath) -> Result<Self, StorageError> {
        let url_ttl = Duration::from_secs(config.signed_url_ttl_secs);
        if config.is_s3_configured() {
            let mut builder = AmazonS3Builder::new()
                .with_bucket_name(&config.bucket)
                .with_region(config.region_or_default())
                .with_access_key_id(&config.access_key_id)
                .with_secret_access_key(&config.secret_access_key);
            if !config.endpoint.is_empty() {
                builder = builder
                    .with_endpoint(&config.endpoint)
                    .with_allow_http(config.endpoint.starts_with("http://"));
            }
            let s3 = builder
                .build()
                .map_err(|e| StorageError::Config(e.to_string()))?;
            tracing::debug!(bucket = %config.bucket, "using S3 attachment storage");
            return Ok(Self {
                backend: Backend::S3(Arc::new(s3)),
                url_ttl,
            });
        }

        let dir = FsPath::new(&config.local_dir);
        let root = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            base_dir.join(dir)
        };
        Self::local(&root, url_ttl)
    }

    /// A store rooted at a local directory, created if missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn local(root: &FsPath, url_ttl: Duration) -> Result<Self, StorageError> {
        std::fs::create_dir_all(root)?;
        let root = root.canonicalize()?;
        let store = LocalFileSystem::new_with_prefix(&root)?;
        tracing::debug!(root = %root.display(), "using local attachment storage");
        Ok(Self {
            backend: Backend::Local {
                store: Arc::new(store),
                root,
            },
            url_ttl,
        })
    }

    /// Whether objects go to a bucket rather than a local directory.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self.backend, Backend::S3(_))
    }

    fn store(&self) -> &dyn ObjectStore {
        match &self.backend {
            Backend::S3(s3) => s3.as_ref(),
            Backend::Local { store, .. } => store.as_ref(),
        }
    }

    /// Write `bytes` under `key`. Returns the stored size.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TooLarge` above the attachment size limit, or
    /// the backend's error if the write fails.
    pub async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<u64, StorageError> {
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if size > MAX_ATTACHMENT_BYTES {
            return Err(StorageError::TooLarge {
                size,
                max: MAX_ATTACHMENT_BYTES,
            });
        }
        let path = Path::parse(key)?;

        let mut opts = PutOptions::default();
        // The local filesystem backend has nowhere to keep attributes.
        if self.is_remote() {
            let mut attributes = Attributes::new();
            attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.to_string()),
            );
            opts.attributes = attributes;
        }
        self.store()
            .put_opts(&path, PutPayload::from(bytes), opts)
            .await?;

        tracing::info!(key, size, content_type, "attachment stored");
        Ok(size)
    }

    /// Read the object under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing is stored under the key.
    pub async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = Path::parse(key)?;
        let bytes = self.store().get(&path).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Remove the object under `key`. Removing a missing object succeeds.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the delete fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = Path::parse(key)?;
        match self.store().delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => {
                tracing::info!(key, "attachment removed");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// A time-limited download URL for `key`.
    ///
    /// Buckets get a presigned GET URL valid for the configured TTL. The
    /// local backend returns a `file://` URL to the object on disk, after
    /// checking it exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for a missing local object, or the
    /// signer's error.
    pub async fn signed_url(&self, key: &str) -> Result<String, StorageError> {
        let path = Path::parse(key)?;
        match &self.backend {
            Backend::S3(s3) => {
                let url = s3
                    .signed_url(http::Method::GET, &path, self.url_ttl)
                    .await?;
                Ok(url.to_string())
            }
            Backend::Local { store, root } => {
                store.head(&path).await?;
                let file = path
                    .parts()
                    .fold(root.clone(), |acc, part| acc.join(part.as_ref()));
                Ok(format!("file://{}", file.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s3_config() -> StorageConfig {
        StorageConfig {
            bucket: "keel".into(),
            endpoint: "http://localhost:9000".into(),
            access_key_id: "minio".into(),
            secret_access_key: "minio-secret".into(),
            signed_url_ttl_secs: 600,
            ..StorageConfig::default()
        }
    }

    #[test]
    fn picks_backend_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let local = AttachmentStore::from_config(&StorageConfig::default(), dir.path()).unwrap();
        assert!(!local.is_remote());
        assert!(dir.path().join(".keel/attachments").is_dir());

        let remote = AttachmentStore::from_config(&s3_config(), dir.path()).unwrap();
        assert!(remote.is_remote());
    }

    #[tokio::test]
    async fn s3_urls_are_presigned() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::from_config(&s3_config(), dir.path()).unwrap();
        let url = store
            .signed_url("org_acme/projects/prj_01/sow.pdf")
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:9000/keel/org_acme/projects/prj_01/sow.pdf?"), "{url}");
        assert!(url.contains("X-Amz-Expires=600"), "{url}");
        assert!(url.contains("X-Amz-Signature="), "{url}");
    }

    #[tokio::test]
    async fn rejects_oversized_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::local(dir.path(), Duration::from_secs(60)).unwrap();
        let too_big = vec![0_u8; usize::try_from(MAX_ATTACHMENT_BYTES).unwrap() + 1];
        let err = store
            .put("org/projects/p/big.bin", "application/octet-stream", too_big)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { .. }));
    }
}
