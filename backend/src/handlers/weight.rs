//! Weight tracking handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{SaveWeightRequest, SaveWeightResponse, WeightResponse};
use crate::state::AppState;

/// GET /weight - Latest measurements of the caller
pub async fn get_weight(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<WeightResponse>, ApiError> {
    let weight = state
        .weight_store
        .latest_weight(user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No weight record found for this user".to_string()))?;

    Ok(Json(WeightResponse {
        user_id: user.user_id,
        weight,
    }))
}

/// POST /weight - Save the caller's measurements
pub async fn save_weight(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<SaveWeightRequest>, JsonRejection>,
) -> Result<Json<SaveWeightResponse>, ApiError> {
    let Json(req) = payload?;
    if !req.is_valid() {
        return Err(ApiError::ValidationError("Invalid input values".to_string()));
    }

    let weight = state.weight_store.upsert_weight(user.user_id, req).await?;
    tracing::info!(user_id = user.user_id, "weight saved");

    Ok(Json(SaveWeightResponse {
        message: "Weight data saved successfully".to_string(),
        weight,
    }))
}
