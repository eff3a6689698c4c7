//! Domain Errors
//!
//! One error type for the whole core. Lookups that find nothing return
//! `Option::None` instead of an error; `NotFound` is reserved for
//! mutations addressed at an id that does not exist.

use thiserror::Error;

use crate::validation::FieldErrors;

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("File format error: {0}")]
    FileFormat(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<FieldErrors> for DomainError {
    fn from(errors: FieldErrors) -> Self {
        DomainError::InvalidInput(errors)
    }
}
