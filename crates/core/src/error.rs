use crate::types::DbId;
use crate::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// One or more request fields are missing, malformed, or out of range.
    #[error("Validation failed: {0}")]
    FieldFormat(FieldErrors),

    /// The guest's visit overlaps another guest's visit on the same date.
    #[error("Guest visit overlaps an existing guest visit")]
    ScheduleConflict,

    /// A uniqueness or referential rule would be broken by the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a single-field [`CoreError::FieldFormat`].
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        CoreError::FieldFormat(errors)
    }
}
