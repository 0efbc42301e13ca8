//! Route definitions for the FittrMe API

mod auth;
mod weight;

use axum::{middleware, routing::get, Router};

use crate::handlers::health;
use crate::middleware::require_auth;
use crate::state::AppState;

pub use auth::{protected_auth_routes, public_auth_routes};
pub use weight::weight_routes;

/// Prefix shared by every API route
pub const API_PREFIX: &str = "/fittrme-api";

/// Assemble the application router.
///
/// Everything under the protected group passes the session gate first.
/// Cross-cutting layers (CORS, tracing, security headers) are added by the
/// binary.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(protected_auth_routes())
        .merge(weight_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .route("/", get(health::root))
        .merge(public_auth_routes())
        .merge(protected);

    // the nested "/" only answers the bare prefix
    Router::new()
        .route("/health", get(health::health_check))
        .route(&format!("{}/", API_PREFIX), get(health::root))
        .nest(API_PREFIX, api)
        .with_state(state)
}
