//! Authentication routes

use axum::{routing::post, Router};

use crate::handlers::auth;
use crate::state::AppState;

/// Routes reachable without a token
pub fn public_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh_token))
}

/// Routes behind the session gate
pub fn protected_auth_routes() -> Router<AppState> {
    Router::new().route("/logout", post(auth::logout))
}
