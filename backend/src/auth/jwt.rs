//! Access token issuing and verification
//!
//! Access tokens are HS256 JWTs carrying `{userId, iat, exp}`. They are
//! never stored; a token is valid exactly when its signature checks out and
//! `exp` is still in the future.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signing algorithms accepted on verification. Anything else is rejected
/// before the signature is looked at.
pub const ALLOWED_ALGORITHMS: &[Algorithm] = &[Algorithm::HS256];

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT-related errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Access token secret is not configured")]
    MissingSecret,

    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    /// Every verification failure maps here
    #[error("Invalid or expired token")]
    InvalidToken,
}

/// Access token claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Issues and verifies access tokens with a symmetric secret
#[derive(Clone)]
pub struct AccessTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    has_secret: bool,
}

impl AccessTokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ALLOWED_ALGORITHMS.to_vec();
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            has_secret: !secret.is_empty(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `user_id`, valid from now for the configured TTL
    pub fn issue(&self, user_id: i64) -> Result<String, JwtError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Mint a token as if issued at `issued_at`
    pub fn issue_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String, JwtError> {
        if !self.has_secret {
            return Err(JwtError::MissingSecret);
        }

        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| JwtError::EncodingFailed("token lifetime out of range".to_string()))?;

        let claims = Claims {
            user_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<i64, JwtError> {
        self.verify_claims(token).map(|claims| claims.user_id)
    }

    /// Verify a token and return its claims
    pub fn verify_claims(&self, token: &str) -> Result<Claims, JwtError> {
        if !self.has_secret {
            return Err(JwtError::InvalidToken);
        }

        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "access token header rejected");
            JwtError::InvalidToken
        })?;

        if !ALLOWED_ALGORITHMS.contains(&header.alg) {
            tracing::debug!(alg = ?header.alg, "access token algorithm not allowed");
            return Err(JwtError::InvalidToken);
        }

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!(error = %e, "access token rejected");
                JwtError::InvalidToken
            })?;

        // jsonwebtoken accepts exp == now; a token expiring this second is dead
        if token_data.claims.exp <= Utc::now().timestamp() {
            return Err(JwtError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key";

    fn issuer() -> AccessTokenIssuer {
        AccessTokenIssuer::new(SECRET, Duration::minutes(15))
    }

    #[test]
    fn test_issue_then_verify() {
        let issuer = issuer();
        for user_id in [1, 42, i64::MAX] {
            let token = issuer.issue(user_id).unwrap();
            assert!(!token.is_empty());
            assert_eq!(issuer.verify(&token).unwrap(), user_id);
        }
    }

    #[test]
    fn test_claims_carry_ttl() {
        let issuer = issuer();
        let token = issuer.issue(5).unwrap();
        let claims = issuer.verify_claims(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        // exp = now - 1s, with a correct signature
        let issued_at = Utc::now() - issuer.ttl() - Duration::seconds(1);
        let token = issuer.issue_at(9, issued_at).unwrap();
        assert!(matches!(issuer.verify(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_token_expiring_now_rejected() {
        let issuer = issuer();
        let token = issuer.issue_at(9, Utc::now() - issuer.ttl()).unwrap();
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let issuer = issuer();
        let token = issuer.issue(3).unwrap();
        let (head, signature) = token.rsplit_once('.').unwrap();

        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}", head, chars.into_iter().collect::<String>());

        assert!(matches!(issuer.verify(&tampered), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer().issue(3).unwrap();
        let other = AccessTokenIssuer::new("another-secret", Duration::minutes(15));
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_unexpected_algorithm_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: 3,
            iat: now,
            exp: now + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(issuer().verify(&token), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_unsigned_token_rejected() {
        // {"alg":"none","typ":"JWT"} . {"userId":3,"iat":0,"exp":9999999999} .
        let token = concat!(
            "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.",
            "eyJ1c2VySWQiOjMsImlhdCI6MCwiZXhwIjo5OTk5OTk5OTk5fQ."
        );
        assert!(issuer().verify(token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(issuer().verify("invalid.token.here").is_err());
        assert!(issuer().verify("").is_err());
    }

    #[test]
    fn test_missing_secret() {
        let issuer = AccessTokenIssuer::new("", Duration::minutes(15));
        assert!(matches!(issuer.issue(1), Err(JwtError::MissingSecret)));
        assert!(matches!(
            issuer.verify("a.b.c"),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_oversized_ttl_is_an_error() {
        let issuer = AccessTokenIssuer::new(SECRET, Duration::days(365 * 400_000));
        assert!(matches!(issuer.issue(1), Err(JwtError::EncodingFailed(_))));
    }

    #[test]
    fn test_error_message_is_opaque() {
        assert_eq!(JwtError::InvalidToken.to_string(), "Invalid or expired token");
    }
}
