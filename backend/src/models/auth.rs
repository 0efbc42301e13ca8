//! Authentication request/response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// POST /register body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    /// Validated after normalization, see `AuthService::signup`
    pub email: String,
    #[validate(length(min = 6, max = 72, message = "password must be 6-72 characters"))]
    pub password: String,
}

/// POST /login body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// POST /refresh body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// User as returned after signup
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Minimal user info returned on login
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Body carrying only a human readable message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Tokens and user produced by a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

/// Tokens produced by redeeming a refresh token
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_field_names() {
        let body = LoginResponse {
            message: "Login successful".to_string(),
            access_token: "a.b.c".to_string(),
            refresh_token: "raw".to_string(),
            user: UserSummary {
                user_id: 1,
                username: "amy".to_string(),
                email: "amy@example.com".to_string(),
            },
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["accessToken"], "a.b.c");
        assert_eq!(json["refreshToken"], "raw");
        assert_eq!(json["user"]["userId"], 1);
    }

    #[test]
    fn test_signup_request_validation() {
        let req = SignupRequest {
            username: "am".to_string(),
            email: "amy@example.com".to_string(),
            password: "correct-horse".to_string(),
        };
        assert!(req.validate().is_err());

        let req = SignupRequest {
            username: "amy".to_string(),
            ..req
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_refresh_request_accepts_camel_case() {
        let req: RefreshTokenRequest =
            serde_json::from_str(r#"{"refreshToken":"abc"}"#).unwrap();
        assert_eq!(req.refresh_token, "abc");
    }
}
