use crate::types::DbId;
use crate::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// One or more field-level rule violations, all reported together.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// A uniqueness or reference violation surfaced by storage.
    #[error("Integrity error: {0}")]
    Integrity(FieldErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation error carrying a single message.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation(FieldErrors::single(field, message))
    }

    /// Shorthand for an integrity error carrying a single message.
    pub fn integrity(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Integrity(FieldErrors::single(field, message))
    }
}
