use thiserror::Error;

use crate::forms::FieldErrors;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The request carries no authenticated user.
    #[error("unauthorized")]
    Unauthorized,
    /// The user is authenticated but may not perform the operation.
    #[error("forbidden")]
    Forbidden,
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// Submitted form data failed validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// Reading or writing the file store failed.
    #[error("storage error: {0}")]
    Storage(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
