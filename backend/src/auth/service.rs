//! Authentication service
//!
//! Orchestrates signup, login, logout and refresh-token redemption on top of
//! the password hasher, access token issuer and refresh token manager.

use std::sync::Arc;

use thiserror::Error;
use validator::Validate;

use crate::config::AuthSettings;
use crate::models::{LoginOutcome, LoginRequest, NewUser, RefreshOutcome, SignupRequest, User};
use crate::store::{CredentialStore, StoreError, UniqueField};

use super::jwt::{AccessTokenIssuer, JwtError};
use super::password::{PasswordError, PasswordHasher};
use super::refresh::{RefreshError, RefreshTokenManager};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Username doesn't exist")]
    UnknownUsername,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Password hashing error: {0}")]
    PasswordError(String),

    #[error("Random source error: {0}")]
    RandomSourceError(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(UniqueField::Email) => AuthError::EmailTaken,
            StoreError::Conflict(UniqueField::Username) => AuthError::UsernameTaken,
            StoreError::Conflict(UniqueField::Other) => {
                AuthError::DatabaseError("unexpected unique constraint violation".to_string())
            }
            StoreError::Database(msg) => AuthError::DatabaseError(msg),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        AuthError::TokenError(e.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::PasswordError(e.to_string())
    }
}

impl From<RefreshError> for AuthError {
    fn from(e: RefreshError) -> Self {
        match e {
            RefreshError::InvalidToken => AuthError::InvalidRefreshToken,
            RefreshError::RandomSource(msg) => AuthError::RandomSourceError(msg),
            RefreshError::TtlOutOfRange => {
                AuthError::TokenError("refresh token lifetime out of range".to_string())
            }
            RefreshError::Store(store) => store.into(),
        }
    }
}

/// Trim and lowercase an email so uniqueness is case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    access_tokens: Arc<AccessTokenIssuer>,
    refresh_tokens: RefreshTokenManager,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(store: Arc<dyn CredentialStore>, settings: &AuthSettings) -> Self {
        Self {
            hasher: PasswordHasher::new(settings.bcrypt_cost),
            access_tokens: Arc::new(AccessTokenIssuer::new(
                &settings.access_secret,
                settings.access_ttl,
            )),
            refresh_tokens: RefreshTokenManager::new(store.clone(), settings.refresh_ttl),
            store,
        }
    }

    /// Register a new user. Email is stored normalized.
    pub async fn signup(&self, req: SignupRequest) -> Result<User, AuthError> {
        req.validate()
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        let email = normalize_email(&req.email);
        if !validator::validate_email(email.as_str()) {
            return Err(AuthError::InvalidInput("Invalid email address".to_string()));
        }

        let password_hash = self.hash_password(req.password).await?;

        // single insert; the unique constraints decide conflicts
        let user = self
            .store
            .insert_user(NewUser {
                username: req.username,
                email,
                password_hash,
            })
            .await
            .map_err(|e| {
                if matches!(e, StoreError::Conflict(_)) {
                    tracing::info!(error = %e, "signup rejected by unique constraint");
                }
                AuthError::from(e)
            })?;

        tracing::info!(user_id = user.user_id, "user registered");
        Ok(user)
    }

    /// Check credentials and mint an access token plus a refresh token
    pub async fn login(&self, req: LoginRequest) -> Result<LoginOutcome, AuthError> {
        req.validate()
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        let user = self
            .store
            .find_user_by_username(&req.username)
            .await?
            .ok_or(AuthError::UnknownUsername)?;

        if !self
            .verify_password(user.password_hash.clone(), req.password)
            .await?
        {
            tracing::warn!(user_id = user.user_id, "login rejected: wrong password");
            return Err(AuthError::InvalidPassword);
        }

        let access_token = self.access_tokens.issue(user.user_id)?;
        let refresh_token = self.refresh_tokens.issue(user.user_id).await?;

        tracing::info!(user_id = user.user_id, "user logged in");

        Ok(LoginOutcome {
            access_token,
            refresh_token: refresh_token.raw,
            user: (&user).into(),
        })
    }

    /// Revoke every refresh token of the user. Idempotent.
    pub async fn logout(&self, user_id: i64) -> Result<u64, AuthError> {
        Ok(self.refresh_tokens.revoke_all(user_id).await?)
    }

    /// Redeem a refresh token: rotate it and mint a new access token
    pub async fn refresh(&self, raw_refresh_token: &str) -> Result<RefreshOutcome, AuthError> {
        let (user_id, replacement) = self.refresh_tokens.redeem(raw_refresh_token).await?;
        let access_token = self.access_tokens.issue(user_id)?;

        Ok(RefreshOutcome {
            user_id,
            access_token,
            refresh_token: replacement.raw,
        })
    }

    /// Number of live refresh tokens (sessions) of a user
    pub async fn active_sessions(&self, user_id: i64) -> Result<i64, AuthError> {
        Ok(self.refresh_tokens.active_count(user_id).await?)
    }

    /// Access token issuer (for the session gate)
    pub fn access_tokens(&self) -> &AccessTokenIssuer {
        &self.access_tokens
    }

    /// Underlying credential store (for health checks)
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::PasswordError(e.to_string()))?
            .map_err(Into::into)
    }

    async fn verify_password(&self, digest: String, password: String) -> Result<bool, AuthError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&digest, &password))
            .await
            .map_err(|e| AuthError::PasswordError(e.to_string()))?
            .map_err(Into::into)
    }
}
