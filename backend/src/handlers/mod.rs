//! API handlers for the FittrMe backend

pub mod auth;
pub mod health;
pub mod weight;

// Re-export AuthenticatedUser from middleware for handler use
pub use crate::middleware::auth::AuthenticatedUser;
