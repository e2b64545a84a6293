//! Storage error types.

/// Errors from attachment object storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No object exists under the key.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Upload exceeds the attachment size limit.
    #[error("Attachment is {size} bytes; the limit is {max} bytes")]
    TooLarge { size: u64, max: u64 },

    /// The key is not a valid object path.
    #[error("Invalid object key: {0}")]
    InvalidKey(#[from] object_store::path::Error),

    /// The backend could not be built from configuration.
    #[error("Storage configuration error: {0}")]
    Config(String),

    /// The bucket or local directory rejected the operation.
    #[error("Object store error: {0}")]
    ObjectStore(object_store::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => Self::NotFound(path),
            other => Self::ObjectStore(other),
        }
    }
}
