//! Cross-cutting error types for Keel.
//!
//! Domain-specific errors (e.g., `DatabaseError`, `StorageError`) are defined in
//! their respective crates and convert from [`CoreError`]. Everything converges
//! into `anyhow` in `keel-cli`.

use std::fmt;

use thiserror::Error;

use crate::enums::EntityType;
use crate::validation::ValidationErrors;

/// Errors that can be raised by any Keel crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: EntityType, id: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Cannot move {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: EntityType,
        id: String,
        from: String,
        to: String,
    },

    /// Input failed field validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    #[must_use]
    pub fn invalid_transition(
        entity_type: EntityType,
        id: &str,
        from: impl fmt::Display,
        to: impl fmt::Display,
    ) -> Self {
        Self::InvalidTransition {
            entity_type,
            id: id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::ProjectStatus;

    #[test]
    fn transition_error_names_both_states() {
        let err = CoreError::invalid_transition(
            EntityType::Project,
            "prj-1",
            ProjectStatus::Completed,
            ProjectStatus::Active,
        );
        assert_eq!(err.to_string(), "Cannot move project prj-1 from completed to active");
    }
}
