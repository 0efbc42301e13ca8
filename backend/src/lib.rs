//! FittrMe Backend Library
//!
//! Session-token authentication core for the FittrMe mobile app: password
//! hashing, short-lived access tokens, rotating refresh tokens, the session
//! gate and the signup/login/logout flows built on them.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
