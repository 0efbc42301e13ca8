//! PostgreSQL implementation of the store traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{CredentialStore, StoreResult, WeightStore};
use crate::models::{NewUser, RefreshToken, SaveWeightRequest, User, WeightRecord};

/// sqlx-backed store sharing the application connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let created: User = sqlx::query_as(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING user_id, username, email, password_hash, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as(
            r#"
            SELECT user_id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_refresh_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<RefreshToken> {
        let token = sqlx::query_as(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at, revoked, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    async fn find_refresh_token_by_hash(
        &self,
        token_hash: &str,
    ) -> StoreResult<Option<RefreshToken>> {
        let token = sqlx::query_as(
            r#"
            SELECT id, user_id, token_hash, expires_at, revoked, created_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn revoke_refresh_token(&self, token_id: i64) -> StoreResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE id = $1 AND revoked = FALSE
            "#,
        )
        .bind(token_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected == 1)
    }

    async fn revoke_user_refresh_tokens(&self, user_id: i64) -> StoreResult<u64> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE user_id = $1 AND revoked = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }

    async fn count_active_refresh_tokens(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM refresh_tokens
            WHERE user_id = $1 AND revoked = FALSE AND expires_at >= $2
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(crate::db::check_health(&self.pool).await?)
    }
}

#[async_trait]
impl WeightStore for PgStore {
    async fn latest_weight(&self, user_id: i64) -> StoreResult<Option<WeightRecord>> {
        let record = sqlx::query_as(
            r#"
            SELECT user_id, current_weight, target_weight, height, updated_at AS measured_at
            FROM weights
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert_weight(
        &self,
        user_id: i64,
        input: SaveWeightRequest,
    ) -> StoreResult<WeightRecord> {
        let record = sqlx::query_as(
            r#"
            INSERT INTO weights (user_id, current_weight, target_weight, height, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                current_weight = EXCLUDED.current_weight,
                target_weight = EXCLUDED.target_weight,
                height = EXCLUDED.height,
                updated_at = NOW()
            RETURNING user_id, current_weight, target_weight, height, updated_at AS measured_at
            "#,
        )
        .bind(user_id)
        .bind(input.current_weight)
        .bind(input.target_weight)
        .bind(input.height)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}
