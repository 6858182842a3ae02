//! Domain-level errors raised by business rules.

use thiserror::Error;

/// A failed business or lookup rule, independent of storage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A referenced record does not exist (or was soft-deleted).
    #[error("{entity} with id {id} was not found")]
    NotFound { entity: String, id: String },

    /// A single field failed validation outside the DTO validators.
    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    /// The request collides with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The request is well-formed but not allowed in the current state.
    #[error("Business rule violated: {0}")]
    BusinessRule(String),
}

impl DomainError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
