//! Authentication HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use super::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, RefreshResponse, RefreshTokenRequest,
    SignupRequest, SignupResponse,
};
use crate::state::AppState;

/// POST /register - Create an account
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let Json(req) = payload?;
    let user = state.auth_service.signup(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "user registered successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// POST /login - Exchange credentials for an access and a refresh token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let outcome = state.auth_service.login(req).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
        user: outcome.user,
    }))
}

/// POST /refresh - Rotate a refresh token and mint a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let Json(req) = payload?;
    let outcome = state.auth_service.refresh(&req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        message: "Token refreshed".to_string(),
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// POST /logout - Revoke every refresh token of the caller
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.logout(user.user_id).await?;

    Ok(Json(MessageResponse::new("Logout successful")))
}
