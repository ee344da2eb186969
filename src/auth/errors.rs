//! # Auth Errors
//!
//! Error types for the authentication module.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ==================
    // Authentication Errors
    // ==================
    /// Unknown email or wrong password (generic - don't leak which)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password does not meet requirements
    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    /// No bearer token on a protected route
    #[error("Not authorized to access this route")]
    AuthenticationRequired,

    // ==================
    // JWT Errors
    // ==================
    /// JWT token is malformed
    #[error("Malformed token")]
    MalformedToken,

    /// JWT token has expired
    #[error("Token expired")]
    TokenExpired,

    /// JWT signature is invalid
    #[error("Invalid token signature")]
    InvalidSignature,

    // ==================
    // Authorization Errors
    // ==================
    /// Authenticated, but the role may not use this route
    #[error("User role '{0}' is not authorized to access this route")]
    RoleNotAllowed(String),

    /// Authenticated, but not the owner of the resource
    #[error("Not authorized to modify this resource")]
    NotOwner,

    // ==================
    // Internal Errors
    // ==================
    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Token generation failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::WeakPassword(_) => 400,

            AuthError::InvalidCredentials
            | AuthError::AuthenticationRequired
            | AuthError::MalformedToken
            | AuthError::TokenExpired
            | AuthError::InvalidSignature => 401,

            AuthError::RoleNotAllowed(_) | AuthError::NotOwner => 403,

            AuthError::HashingFailed | AuthError::TokenGenerationFailed => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::RoleNotAllowed("user".into()).status_code(), 403);
        assert_eq!(AuthError::WeakPassword("short".into()).status_code(), 400);
        assert_eq!(AuthError::HashingFailed.status_code(), 500);
    }

    #[test]
    fn test_error_messages_do_not_leak_info() {
        let err = AuthError::InvalidCredentials;
        assert!(!err.to_string().contains("password"));
        assert!(!err.to_string().contains("email"));
    }
}
