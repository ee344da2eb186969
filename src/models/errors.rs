//! # Model Errors
//!
//! Faults raised while validating request payloads.

use thiserror::Error;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Payload validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Body could not be read as the expected shape
    #[error("Invalid request body: {0}")]
    MalformedBody(String),

    /// A field failed validation
    #[error("{field}: {reason}")]
    Invalid { field: String, reason: String },

    /// A unique field already holds this value
    #[error("Duplicate field value entered: {field}")]
    Duplicate { field: String },

    /// Body carried a key reserved for store operators
    #[error("Forbidden key in request body: {0}")]
    ForbiddenKey(String),
}

impl ModelError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn required(field: &str) -> Self {
        Self::invalid(field, "is required")
    }

    pub fn duplicate(field: impl Into<String>) -> Self {
        ModelError::Duplicate {
            field: field.into(),
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ModelError::Duplicate { .. } => 409,
            _ => 400,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::MalformedBody(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ModelError::required("name").status_code(), 400);
        assert_eq!(ModelError::duplicate("name").status_code(), 409);
        assert_eq!(ModelError::ForbiddenKey("$gt".into()).status_code(), 400);
    }

    #[test]
    fn test_messages() {
        assert_eq!(ModelError::required("name").to_string(), "name: is required");
        assert_eq!(
            ModelError::duplicate("email").to_string(),
            "Duplicate field value entered: email"
        );
    }
}
