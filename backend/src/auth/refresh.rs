//! Refresh token lifecycle
//!
//! Refresh tokens are opaque 256-bit random strings. The client receives the
//! raw value once; the store only ever sees its SHA-256 hash.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::RefreshToken;
use crate::store::{CredentialStore, StoreError};

/// Random bytes per token
pub const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Secure random source unavailable: {0}")]
    RandomSource(String),

    #[error("Invalid or expired refresh token")]
    InvalidToken,

    #[error("Refresh token lifetime out of range")]
    TtlOutOfRange,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Freshly minted token. `raw` goes to the client, `hash` to the store.
#[derive(Clone)]
pub struct GeneratedRefreshToken {
    pub raw: String,
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for GeneratedRefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedRefreshToken")
            .field("raw", &"<redacted>")
            .field("hash", &self.hash)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// SHA-256 of the raw token, URL-safe base64 without padding
pub fn hash_refresh_token(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Build a token from `rng`. Fails if the source cannot deliver; there is
/// no fallback to a weaker generator.
pub fn generate_with<R: RngCore + ?Sized>(
    rng: &mut R,
    ttl: Duration,
) -> Result<GeneratedRefreshToken, RefreshError> {
    let expires_at = Utc::now()
        .checked_add_signed(ttl)
        .ok_or(RefreshError::TtlOutOfRange)?;

    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| RefreshError::RandomSource(e.to_string()))?;

    let raw = URL_SAFE_NO_PAD.encode(bytes);
    let hash = hash_refresh_token(&raw);

    Ok(GeneratedRefreshToken {
        raw,
        hash,
        expires_at,
    })
}

/// Generates, persists, redeems and revokes refresh tokens
#[derive(Clone)]
pub struct RefreshTokenManager {
    store: Arc<dyn CredentialStore>,
    ttl: Duration,
}

impl RefreshTokenManager {
    pub fn new(store: Arc<dyn CredentialStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Draw a new token from the operating system CSPRNG
    pub fn generate(&self) -> Result<GeneratedRefreshToken, RefreshError> {
        generate_with(&mut OsRng, self.ttl)
    }

    /// Store the hash of a generated token for `user_id`
    pub async fn persist(
        &self,
        user_id: i64,
        hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, RefreshError> {
        Ok(self
            .store
            .insert_refresh_token(user_id, hash, expires_at)
            .await?)
    }

    /// Generate and persist in one step
    pub async fn issue(&self, user_id: i64) -> Result<GeneratedRefreshToken, RefreshError> {
        let token = self.generate()?;
        let stored = self.persist(user_id, &token.hash, token.expires_at).await?;
        tracing::debug!(user_id, token_id = stored.id, "refresh token issued");
        Ok(token)
    }

    /// Revoke every live token of `user_id`. Succeeds when there are none.
    pub async fn revoke_all(&self, user_id: i64) -> Result<u64, RefreshError> {
        let revoked = self.store.revoke_user_refresh_tokens(user_id).await?;
        tracing::info!(user_id, revoked, "refresh tokens revoked");
        Ok(revoked)
    }

    /// Exchange a raw token for a replacement.
    ///
    /// The presented token is revoked with a conditional update, so only one
    /// of several concurrent redemptions can win. Returns the owner and the
    /// new token.
    pub async fn redeem(&self, raw: &str) -> Result<(i64, GeneratedRefreshToken), RefreshError> {
        let hash = hash_refresh_token(raw);

        let stored = self
            .store
            .find_refresh_token_by_hash(&hash)
            .await?
            .ok_or(RefreshError::InvalidToken)?;

        if !stored.is_active(Utc::now()) {
            tracing::warn!(
                user_id = stored.user_id,
                token_id = stored.id,
                revoked = stored.revoked,
                "dead refresh token presented"
            );
            return Err(RefreshError::InvalidToken);
        }

        if !self.store.revoke_refresh_token(stored.id).await? {
            tracing::warn!(
                user_id = stored.user_id,
                token_id = stored.id,
                "refresh token redeemed concurrently"
            );
            return Err(RefreshError::InvalidToken);
        }

        // the presented token is already spent; a failure here logs the user out
        let replacement = self.issue(stored.user_id).await.map_err(|e| {
            tracing::warn!(
                user_id = stored.user_id,
                token_id = stored.id,
                error = %e,
                "replacement refresh token not issued after revocation"
            );
            e
        })?;
        Ok((stored.user_id, replacement))
    }

    /// Number of live tokens owned by `user_id`
    pub async fn active_count(&self, user_id: i64) -> Result<i64, RefreshError> {
        Ok(self
            .store
            .count_active_refresh_tokens(user_id, Utc::now())
            .await?)
    }
}
