//! Password hashing
//!
//! bcrypt digests are self-salted and carry their algorithm and cost in the
//! `$2b$<cost>$` prefix, so verification needs nothing but the stored string.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashFailed(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// bcrypt hasher with a fixed work factor
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| PasswordError::HashFailed(e.to_string()))
    }

    /// Check a plaintext password against a stored digest.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when `digest` cannot
    /// be parsed.
    pub fn verify(&self, digest: &str, plaintext: &str) -> Result<bool, PasswordError> {
        bcrypt::verify(plaintext, digest).map_err(|e| PasswordError::MalformedHash(e.to_string()))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
