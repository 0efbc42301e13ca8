//! Authentication core for the FittrMe backend
//!
//! - bcrypt password hashing
//! - HS256 access tokens with an explicit algorithm allow-list
//! - opaque refresh tokens stored as SHA-256 hashes, rotated on redemption
//! - signup / login / logout / refresh orchestration

mod jwt;
mod password;
mod refresh;
mod service;

pub use jwt::{AccessTokenIssuer, Claims, JwtError, ALLOWED_ALGORITHMS};
pub use password::{PasswordError, PasswordHasher};
pub use refresh::{
    generate_with, hash_refresh_token, GeneratedRefreshToken, RefreshError, RefreshTokenManager,
    REFRESH_TOKEN_BYTES,
};
pub use service::{normalize_email, AuthError, AuthService};
