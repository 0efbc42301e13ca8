//! Weight tracking routes (protected)

use axum::{routing::get, Router};

use crate::handlers::weight::{get_weight, save_weight};
use crate::state::AppState;

pub fn weight_routes() -> Router<AppState> {
    Router::new().route("/weight", get(get_weight).post(save_weight))
}
