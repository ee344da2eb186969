//! # Query Errors
//!
//! Error types raised while translating raw query parameters.
//! Store failures during execution are reported as [`StoreError`](crate::store::StoreError).

use thiserror::Error;

/// Result type for query translation
pub type QueryResult<T> = Result<T, ValidationError>;

/// Translator faults. Every variant names the offending parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Key or value does not follow `field` / `field[op]` syntax
    #[error("Malformed query parameter '{param}': {reason}")]
    MalformedParam { param: String, reason: String },

    /// Bracketed operator outside the supported set
    #[error("Unsupported operator '{operator}' in parameter '{param}'")]
    UnknownOperator { param: String, operator: String },

    /// Field path that could reach the store's operator syntax
    #[error("Invalid field name in parameter '{param}'")]
    InvalidField { param: String },

    /// Equality and range operators mixed on one field
    #[error("Conflicting filters for field '{param}'")]
    ConflictingFilter { param: String },

    /// Non-numeric, non-positive or out-of-range page/limit
    #[error("Invalid value '{value}' for '{param}': {reason}")]
    InvalidPagination {
        param: String,
        value: String,
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn malformed(param: &str, reason: impl Into<String>) -> Self {
        ValidationError::MalformedParam {
            param: param.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn pagination(param: &str, value: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidPagination {
            param: param.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the query parameter that caused the error
    pub fn param(&self) -> &str {
        match self {
            ValidationError::MalformedParam { param, .. }
            | ValidationError::UnknownOperator { param, .. }
            | ValidationError::InvalidField { param }
            | ValidationError::ConflictingFilter { param }
            | ValidationError::InvalidPagination { param, .. } => param,
        }
    }
}
