//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::AuthService;
use crate::store::WeightStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub weight_store: Arc<dyn WeightStore>,
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>, weight_store: Arc<dyn WeightStore>) -> Self {
        Self {
            auth_service,
            weight_store,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn WeightStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.weight_store.clone()
    }
}
