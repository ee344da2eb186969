//! # Request Identity
//!
//! Who is calling, and the checks protected routes run against it.

use axum::http::{header, HeaderMap};

use super::errors::{AuthError, AuthResult};
use super::role::Role;

/// Authenticated caller of a protected route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Grant access only to the listed roles
    pub fn authorize(&self, roles: &[Role]) -> AuthResult<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AuthError::RoleNotAllowed(self.role.to_string()))
        }
    }

    /// Owners and admins may modify a resource
    pub fn ensure_owner(&self, owner_id: Option<&str>) -> AuthResult<()> {
        if self.is_admin() || owner_id == Some(self.id.as_str()) {
            Ok(())
        } else {
            Err(AuthError::NotOwner)
        }
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> AuthResult<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::AuthenticationRequired)
}
