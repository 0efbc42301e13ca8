//! Liveness and health endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::models::MessageResponse;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}

/// GET /fittrme-api/ - Banner
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("FittrMe backend is running"))
}

/// GET /health - Report database connectivity
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database) = match state.auth_service.store().ping().await {
        Ok(()) => ("healthy", "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            ("unhealthy", "unreachable".to_string())
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
