//! Persistence seam for credentials, refresh tokens and weights
//!
//! The auth core talks to storage only through these traits. [`PgStore`] is
//! the production implementation; [`MemoryStore`] backs the test suites.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{NewUser, RefreshToken, SaveWeightRequest, User, WeightRecord};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Column whose unique constraint rejected an insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    Other,
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unique constraint violated on {0:?}")]
    Conflict(UniqueField),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                let field = match db_err.constraint() {
                    Some(c) if c.contains("email") => UniqueField::Email,
                    Some(c) if c.contains("username") => UniqueField::Username,
                    _ => UniqueField::Other,
                };
                return StoreError::Conflict(field);
            }
        }
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Users and refresh-token records
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Insert a user in a single statement. Unique violations surface as
    /// [`StoreError::Conflict`].
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn insert_refresh_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<RefreshToken>;

    async fn find_refresh_token_by_hash(&self, token_hash: &str)
        -> StoreResult<Option<RefreshToken>>;

    /// Revoke one token if it is still unrevoked. Returns `false` when it was
    /// already revoked (or does not exist).
    async fn revoke_refresh_token(&self, token_id: i64) -> StoreResult<bool>;

    /// Revoke every unrevoked token of a user, returning how many changed.
    async fn revoke_user_refresh_tokens(&self, user_id: i64) -> StoreResult<u64>;

    /// Count tokens of a user that are neither revoked nor expired at `now`.
    async fn count_active_refresh_tokens(&self, user_id: i64, now: DateTime<Utc>)
        -> StoreResult<i64>;

    /// Connectivity probe for health checks
    async fn ping(&self) -> StoreResult<()>;
}

/// Per-user weight measurements
#[async_trait]
pub trait WeightStore: Send + Sync + 'static {
    async fn latest_weight(&self, user_id: i64) -> StoreResult<Option<WeightRecord>>;

    /// Insert or replace the user's measurements
    async fn upsert_weight(&self, user_id: i64, input: SaveWeightRequest)
        -> StoreResult<WeightRecord>;
}
