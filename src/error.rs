use thiserror::Error;

use crate::validation::ValidationErrors;

/// Every way an address operation can fail.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AddressError {
    #[error("Address validation error: {0}")]
    ValidationError(ValidationErrors),
    #[error("Address not found: {0}")]
    NotFound(i64),
    #[error("Address already exists: {0}")]
    Conflict(String),
    #[error("Address update rejected: {0}")]
    BadRequest(String),
    #[error("Address store error: {0}")]
    StoreError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Fieldless view of [`AddressError`] for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    BadRequest,
    Internal,
}

impl AddressError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AddressError::ValidationError(_) => ErrorKind::Validation,
            AddressError::NotFound(_) => ErrorKind::NotFound,
            AddressError::Conflict(_) => ErrorKind::Conflict,
            AddressError::BadRequest(_) => ErrorKind::BadRequest,
            AddressError::StoreError(_) | AddressError::ActorCommunicationError(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-equivalent status for the boundary layer.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 422,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::BadRequest => 400,
            ErrorKind::Internal => 500,
        }
    }
}

impl From<ValidationErrors> for AddressError {
    fn from(errors: ValidationErrors) -> Self {
        AddressError::ValidationError(errors)
    }
}

impl From<sqlx::Error> for AddressError {
    fn from(error: sqlx::Error) -> Self {
        AddressError::StoreError(error.to_string())
    }
}

/// True when the store rejected a write because of a UNIQUE constraint.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FieldError, ViolationKind};

    #[test]
    fn kinds_map_to_status_codes() {
        let validation: ValidationErrors =
            FieldError::new(&["body", "latitude"], ViolationKind::LessThanEqual, "too big").into();
        let cases = [
            (AddressError::from(validation), 422),
            (AddressError::NotFound(3), 404),
            (AddressError::Conflict("HQ".into()), 409),
            (AddressError::BadRequest("duplicate name".into()), 400),
            (AddressError::StoreError("disk full".into()), 500),
            (AddressError::ActorCommunicationError("Actor closed".into()), 500),
        ];
        for (error, status) in cases {
            assert_eq!(error.status_code(), status, "{error}");
        }
    }

    #[test]
    fn non_database_errors_are_not_conflicts() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        let error = AddressError::from(sqlx::Error::PoolClosed);
        assert_eq!(error.kind(), ErrorKind::Internal);
    }

    #[test]
    fn messages_identify_the_record() {
        assert_eq!(AddressError::NotFound(42).to_string(), "Address not found: 42");
        assert_eq!(AddressError::Conflict("HQ".into()).to_string(), "Address already exists: HQ");
    }
}
