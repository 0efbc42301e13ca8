//! In-memory store used by tests and local experiments
//!
//! Mirrors the PostgreSQL schema constraints: unique username and email,
//! conditional revocation, one weight record per user.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError, StoreResult, UniqueField, WeightStore};
use crate::models::{NewUser, RefreshToken, SaveWeightRequest, User, WeightRecord};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    refresh_tokens: Vec<RefreshToken>,
    weights: HashMap<i64, WeightRecord>,
    next_user_id: i64,
    next_token_id: i64,
}

/// Thread-safe in-memory store
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every refresh token row, for assertions
    pub async fn refresh_tokens(&self) -> Vec<RefreshToken> {
        self.tables.read().await.refresh_tokens.clone()
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(UniqueField::Username));
        }

        tables.next_user_id += 1;
        let created = User {
            user_id: tables.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());

        Ok(created)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_refresh_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<RefreshToken> {
        let mut tables = self.tables.write().await;

        if !tables.users.iter().any(|u| u.user_id == user_id) {
            return Err(StoreError::Database(format!(
                "foreign key violation: user {} does not exist",
                user_id
            )));
        }

        tables.next_token_id += 1;
        let token = RefreshToken {
            id: tables.next_token_id,
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            revoked: false,
            created_at: Utc::now(),
        };
        tables.refresh_tokens.push(token.clone());

        Ok(token)
    }

    async fn find_refresh_token_by_hash(
        &self,
        token_hash: &str,
    ) -> StoreResult<Option<RefreshToken>> {
        let tables = self.tables.read().await;
        Ok(tables
            .refresh_tokens
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn revoke_refresh_token(&self, token_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .refresh_tokens
            .iter_mut()
            .find(|t| t.id == token_id && !t.revoked)
        {
            Some(token) => {
                token.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_user_refresh_tokens(&self, user_id: i64) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let mut revoked = 0;
        for token in tables
            .refresh_tokens
            .iter_mut()
            .filter(|t| t.user_id == user_id && !t.revoked)
        {
            token.revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn count_active_refresh_tokens(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .refresh_tokens
            .iter()
            .filter(|t| t.user_id == user_id && t.is_active(now))
            .count();
        Ok(count as i64)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl WeightStore for MemoryStore {
    async fn latest_weight(&self, user_id: i64) -> StoreResult<Option<WeightRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.weights.get(&user_id).cloned())
    }

    async fn upsert_weight(
        &self,
        user_id: i64,
        input: SaveWeightRequest,
    ) -> StoreResult<WeightRecord> {
        let mut tables = self.tables.write().await;
        let record = WeightRecord {
            user_id,
            current_weight: input.current_weight,
            target_weight: input.target_weight,
            height: input.height,
            measured_at: Utc::now(),
        };
        tables.weights.insert(user_id, record.clone());
        Ok(record)
    }
}
