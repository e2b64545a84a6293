//! Database error types for keel-db.

use keel_core::enums::EntityType;
use keel_core::errors::CoreError;
use keel_core::validation::ValidationErrors;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned data that could not be parsed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// No entity with this ID exists in the tenant's organization.
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: EntityType, id: String },

    /// The operation is not allowed in the entity's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Input failed field validation. Raised before any SQL runs.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    pub(crate) fn not_found(entity_type: EntityType, id: &str) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Whether the error means the caller asked for something that does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoResult)
    }
}

impl From<CoreError> for DatabaseError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            CoreError::InvalidTransition { .. } => Self::InvalidState(err.to_string()),
            CoreError::Validation(errors) => Self::Validation(errors),
            CoreError::Other(other) => Self::Other(other),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(err.into())
    }
}
