//! Uniform `{status, message, data | errors}` envelope for every outcome.

use serde::Serialize;

use crate::error::AddressError;
use crate::validation::FieldError;

pub const HTTP_OK: u16 = 200;
pub const HTTP_CREATED: u16 = 201;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Empty `data` object, rendered as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Empty {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    /// Transport status; not part of the body.
    #[serde(skip)]
    pub status_code: u16,
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(status_code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status_code,
            status: ResponseStatus::Success,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    /// Renders a failed operation. Internal failures get a generic message so
    /// store details never reach the caller.
    pub fn from_error(error: &AddressError) -> Self {
        let message = match error {
            AddressError::ValidationError(_) => "Validation Error".to_string(),
            AddressError::StoreError(_) | AddressError::ActorCommunicationError(_) => {
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };
        let errors = match error {
            AddressError::ValidationError(errors) => Some(errors.errors().to_vec()),
            _ => None,
        };
        Self {
            status_code: error.status_code(),
            status: ResponseStatus::Error,
            message,
            data: None,
            errors,
        }
    }

    /// Turns any operation result into an envelope.
    pub fn from_result(
        result: &Result<T, AddressError>,
        status_code: u16,
        message: impl Into<String>,
    ) -> Self
    where
        T: Clone,
    {
        match result {
            Ok(data) => Self::success(status_code, message, data.clone()),
            Err(e) => Self::from_error(e),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
