//! Data models for the FittrMe backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod auth;
pub mod weight;

pub use auth::*;
pub use weight::*;

/// Registered user
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    /// bcrypt digest, never sent to clients
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a user; the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Stored refresh token. Only the hash of the raw value is kept.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// A token is live until revoked or past its expiry
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now <= self.expires_at
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> User {
        User {
            user_id: 7,
            username: "amy".to_string(),
            email: "amy@example.com".to_string(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuu".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let json = serde_json::to_value(user()).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["username"], "amy");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_refresh_token_activity() {
        let now = Utc::now();
        let mut token = RefreshToken {
            id: 1,
            user_id: 7,
            token_hash: "hash".to_string(),
            expires_at: now + Duration::days(1),
            revoked: false,
            created_at: now,
        };
        assert!(token.is_active(now));

        token.revoked = true;
        assert!(!token.is_active(now));

        token.revoked = false;
        token.expires_at = now - Duration::seconds(1);
        assert!(!token.is_active(now));
    }
}
