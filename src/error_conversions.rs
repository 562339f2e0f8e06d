//! Error conversion glue between layers.
//!
//! The domain layer must not depend on repository or service error types, so
//! the conversions live here.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

#[cfg(feature = "server")]
mod server {
    use crate::forms::FieldErrors;
    use crate::repository::errors::RepositoryError;
    use crate::services::ServiceError;

    impl From<RepositoryError> for ServiceError {
        fn from(val: RepositoryError) -> Self {
            match val {
                RepositoryError::NotFound => ServiceError::NotFound,
                other => {
                    log::error!("Repository error: {other}");
                    ServiceError::Internal
                }
            }
        }
    }

    impl From<FieldErrors> for ServiceError {
        fn from(val: FieldErrors) -> Self {
            ServiceError::Validation(val)
        }
    }

    impl From<std::io::Error> for ServiceError {
        fn from(val: std::io::Error) -> Self {
            ServiceError::Storage(val.to_string())
        }
    }
}
