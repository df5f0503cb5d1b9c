//! Shared domain error type.

use crate::types::DbId;

/// Domain-level error used across the repository and pipeline layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation violates a uniqueness or state invariant.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The acting user is not allowed to perform this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_entity_and_id() {
        let err = CoreError::not_found("ticket", 42);
        assert_eq!(err.to_string(), "ticket with id 42 not found");
    }

    #[test]
    fn conflict_display() {
        let err = CoreError::Conflict("solution already exists for ticket 7".into());
        assert!(err.to_string().starts_with("Conflict:"));
    }
}
