//! Centralized API error handling
//!
//! One error type for every HTTP response, mapped onto status codes and a
//! JSON body of the form `{"error": "<message>", "code": "<CODE>"}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Message sent in place of any server-side failure detail
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to clients
    pub fn public_message(&self) -> &str {
        match self {
            ApiError::ValidationError(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg) => msg,
            ApiError::InternalError(_) | ApiError::DatabaseError(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code = %code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = %code, "Client error occurred");
        }

        let body = ErrorResponse {
            error: self.public_message().to_string(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidInput(_) => ApiError::ValidationError(err.to_string()),
            AuthError::EmailTaken | AuthError::UsernameTaken => {
                ApiError::Conflict(err.to_string())
            }
            AuthError::UnknownUsername
            | AuthError::InvalidPassword
            | AuthError::InvalidRefreshToken => ApiError::Unauthorized(err.to_string()),
            AuthError::DatabaseError(msg) => ApiError::DatabaseError(msg),
            AuthError::TokenError(_)
            | AuthError::PasswordError(_)
            | AuthError::RandomSourceError(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => ApiError::Conflict("Resource already exists".to_string()),
            StoreError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationError(rejection.body_text())
    }
}
