//! Middleware for the FittrMe API
//!
//! Request tracing, security headers and the session gate.

pub mod auth;
mod security;
mod tracing;

pub use auth::{authenticate, require_auth, AuthenticatedUser, GateRejection};
pub use self::security::{hsts_header, security_headers};
pub use self::tracing::request_tracing;
