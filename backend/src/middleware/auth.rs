//! Session gate
//!
//! Verifies the bearer access token of protected requests and makes the
//! resolved identity available to handlers for the rest of that request.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::auth::{AccessTokenIssuer, AuthService};
use crate::error::ApiError;

pub const MISSING_HEADER_MESSAGE: &str = "Missing or invalid Authorization header";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// Identity established by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

/// Why the gate turned a request away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    MissingHeader,
    InvalidToken,
}

impl GateRejection {
    pub fn message(&self) -> &'static str {
        match self {
            GateRejection::MissingHeader => MISSING_HEADER_MESSAGE,
            GateRejection::InvalidToken => INVALID_TOKEN_MESSAGE,
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        ApiError::Unauthorized(self.message().to_string()).into_response()
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Run the gate against a set of request headers
pub fn authenticate(
    headers: &HeaderMap,
    access_tokens: &AccessTokenIssuer,
) -> Result<AuthenticatedUser, GateRejection> {
    let token = bearer_token(headers).ok_or(GateRejection::MissingHeader)?;

    let user_id = access_tokens
        .verify(&token)
        .map_err(|_| GateRejection::InvalidToken)?;

    Ok(AuthenticatedUser { user_id })
}

/// Middleware for protected routers.
///
/// Rejects with 401 or inserts [`AuthenticatedUser`] into the request
/// extensions before calling the next handler.
pub async fn require_auth(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), auth_service.access_tokens()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(rejection) => {
            tracing::debug!(
                path = %request.uri().path(),
                reason = ?rejection,
                "request rejected by session gate"
            );
            rejection.into_response()
        }
    }
}

/// Extractor for authenticated users
///
/// Uses the identity injected by [`require_auth`] when present, otherwise
/// verifies the bearer token itself.
///
/// ```rust,ignore
/// async fn protected_handler(user: AuthenticatedUser) -> impl IntoResponse {
///     format!("Hello, user {}", user.user_id)
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(*user);
        }

        let auth_service = Arc::<AuthService>::from_ref(state);
        authenticate(&parts.headers, auth_service.access_tokens())
            .map_err(IntoResponse::into_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, HeaderValue};
    use chrono::{Duration, Utc};

    fn issuer() -> AccessTokenIssuer {
        AccessTokenIssuer::new("gate-secret", Duration::minutes(15))
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header() {
        let result = authenticate(&HeaderMap::new(), &issuer());
        assert_eq!(result, Err(GateRejection::MissingHeader));
    }

    #[test]
    fn test_wrong_scheme() {
        let token = issuer().issue(1).unwrap();
        let result = authenticate(&headers_with(&format!("Token {}", token)), &issuer());
        assert_eq!(result, Err(GateRejection::MissingHeader));

        let result = authenticate(&headers_with("Basic YW15OnB3"), &issuer());
        assert_eq!(result, Err(GateRejection::MissingHeader));
    }

    #[test]
    fn test_invalid_token() {
        let result = authenticate(&headers_with("Bearer not.a.jwt"), &issuer());
        assert_eq!(result, Err(GateRejection::InvalidToken));
    }

    #[test]
    fn test_expired_token() {
        let issuer = issuer();
        let token = issuer
            .issue_at(1, Utc::now() - Duration::minutes(16))
            .unwrap();
        let result = authenticate(&headers_with(&format!("Bearer {}", token)), &issuer);
        assert_eq!(result, Err(GateRejection::InvalidToken));
    }

    #[test]
    fn test_valid_token() {
        let issuer = issuer();
        let token = issuer.issue(77).unwrap();
        let result = authenticate(&headers_with(&format!("Bearer {}", token)), &issuer);
        assert_eq!(result, Ok(AuthenticatedUser { user_id: 77 }));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            GateRejection::MissingHeader.message(),
            "Missing or invalid Authorization header"
        );
        assert_eq!(GateRejection::InvalidToken.message(), "Invalid or expired token");
    }
}
