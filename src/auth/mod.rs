//! # Auth Module
//!
//! Access tokens, password hashing and the `protect` / `authorize`
//! checks used by the HTTP handlers.

pub mod context;
pub mod crypto;
pub mod errors;
pub mod jwt;
pub mod role;

pub use context::{bearer_token, CurrentUser};
pub use errors::{AuthError, AuthResult};
pub use jwt::{JwtClaims, JwtConfig, JwtManager};
pub use role::Role;
