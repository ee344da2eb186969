//! # Store Errors
//!
//! Failures surfaced by the document store. Never retried inside the crate.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Connection to the store failed or the store is offline
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store did not answer in time
    #[error("Store operation timed out")]
    Timeout,

    /// The store refused the operation (bad document, duplicate key)
    #[error("Store rejected operation: {0}")]
    Rejected(String),

    #[error("Store error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StoreError::Unavailable("offline".into()).to_string(),
            "Store unavailable: offline"
        );
        assert_eq!(StoreError::Timeout.to_string(), "Store operation timed out");
    }
}
