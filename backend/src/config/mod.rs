//! Configuration management for the FittrMe backend
//!
//! Loads and validates configuration from environment variables, with support
//! for different environments (development, staging, production).

use std::env;

use chrono::Duration;
use thiserror::Error;

const DEV_ACCESS_SECRET: &str = "development-access-secret-change-in-production";

/// One day
const MAX_ACCESS_TOKEN_TTL_MIN: i64 = 24 * 60;
/// Ten years
const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 3650;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// Maximum database connections
    pub db_max_connections: u32,

    /// CORS allowed origins (comma separated)
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,

    /// Secret used to sign access tokens
    pub jwt_access_secret: String,

    /// Access token TTL in minutes (default: 15)
    pub access_token_ttl_minutes: i64,

    /// Refresh token TTL in days (default: 30)
    pub refresh_token_ttl_days: i64,

    /// bcrypt work factor for password hashing
    pub bcrypt_cost: u32,
}

/// Immutable settings shared by the token and password components.
///
/// Built once at startup from [`Config`] and handed to each component at
/// construction; nothing in the auth core reads the process environment.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub access_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .map(|s| Environment::parse(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let db_max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").filter(|v| !v.trim().is_empty());

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let jwt_access_secret = match lookup("JWT_ACCESS_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if environment.is_production() => {
                return Err(ConfigError::MissingEnvVar("JWT_ACCESS_SECRET".to_string()))
            }
            None => DEV_ACCESS_SECRET.to_string(),
        };

        let access_token_ttl_minutes = bounded_ttl(
            "ACCESS_TOKEN_TTL_MIN",
            lookup("ACCESS_TOKEN_TTL_MIN"),
            15,
            MAX_ACCESS_TOKEN_TTL_MIN,
        )?;
        let refresh_token_ttl_days = bounded_ttl(
            "REFRESH_TOKEN_TTL_DAYS",
            lookup("REFRESH_TOKEN_TTL_DAYS"),
            30,
            MAX_REFRESH_TOKEN_TTL_DAYS,
        )?;

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => {
                let cost = raw.parse::<u32>().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "BCRYPT_COST must be a number, got '{}'",
                        raw
                    ))
                })?;
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::InvalidValue(format!(
                        "BCRYPT_COST must be between 4 and 31, got {}",
                        cost
                    )));
                }
                cost
            }
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Config {
            database_url,
            environment,
            port,
            db_max_connections,
            cors_allowed_origins,
            log_level,
            jwt_access_secret,
            access_token_ttl_minutes,
            refresh_token_ttl_days,
            bcrypt_cost,
        })
    }

    /// Whether the access secret is the built-in development fallback
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_access_secret == DEV_ACCESS_SECRET
    }

    /// Settings consumed by the auth core
    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            access_secret: self.jwt_access_secret.clone(),
            access_ttl: Duration::minutes(self.access_token_ttl_minutes),
            refresh_ttl: Duration::days(self.refresh_token_ttl_days),
            bcrypt_cost: self.bcrypt_cost,
        }
    }

    /// Get database URL with the password masked (for logging)
    pub fn database_url_masked(&self) -> String {
        if let Some(at_pos) = self.database_url.find('@') {
            if let Some(colon_pos) = self.database_url[..at_pos].rfind(':') {
                let prefix = &self.database_url[..colon_pos + 1];
                let suffix = &self.database_url[at_pos..];
                // no password present, only the scheme colon
                if !self.database_url[colon_pos..].starts_with("://") {
                    return format!("{}****{}", prefix, suffix);
                }
            }
        }
        self.database_url.clone()
    }
}

/// Parse a TTL. Missing, unparsable or non-positive values fall back to
/// `default`; values above `max` are rejected.
fn bounded_ttl(
    name: &str,
    raw: Option<String>,
    default: i64,
    max: i64,
) -> Result<i64, ConfigError> {
    let ttl = raw
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default);

    if ttl > max {
        return Err(ConfigError::InvalidValue(format!(
            "{} must be at most {}, got {}",
            name, max, ttl
        )));
    }
    Ok(ttl)
}
